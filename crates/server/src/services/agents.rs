//! Static registry of the agents exposed by the API.
//!
//! Only the router agent is wired to the model; the others describe the tool
//! groupings it routes between and exist so the UI can render capabilities.

use serde::Serialize;

/// Metadata for an agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    /// Stable agent ID.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// What the agent handles.
    pub description: &'static str,
    /// Tool names available to the agent.
    pub tools: &'static [&'static str],
}

const AGENTS: &[AgentInfo] = &[
    AgentInfo {
        id: "router",
        name: "Router Agent",
        description: "Routes user requests to order, billing, or support tools based on intent.",
        tools: &[
            "getOrderDetails",
            "checkDeliveryStatus",
            "getInvoiceDetails",
            "checkRefundStatus",
            "searchProducts",
            "searchConversationHistory",
        ],
    },
    AgentInfo {
        id: "order",
        name: "Order Agent",
        description: "Handles order lookups and delivery status queries.",
        tools: &["getOrderDetails", "checkDeliveryStatus"],
    },
    AgentInfo {
        id: "billing",
        name: "Billing Agent",
        description: "Handles invoice lookups and refund status checks.",
        tools: &["getInvoiceDetails", "checkRefundStatus"],
    },
    AgentInfo {
        id: "support",
        name: "Support Agent",
        description: "Handles FAQs and conversation history searches.",
        tools: &["searchProducts", "searchConversationHistory"],
    },
];

/// All registered agents.
#[must_use]
pub const fn list() -> &'static [AgentInfo] {
    AGENTS
}

/// Look up an agent by ID.
#[must_use]
pub fn get(id: &str) -> Option<&'static AgentInfo> {
    AGENTS.iter().find(|agent| agent.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::support_function_declarations;

    #[test]
    fn test_four_agents_registered() {
        assert_eq!(list().len(), 4);
    }

    #[test]
    fn test_get_router() {
        let router = get("router").expect("router agent");
        assert_eq!(router.tools.len(), 6);
    }

    #[test]
    fn test_get_unknown_agent() {
        assert!(get("escalation").is_none());
    }

    #[test]
    fn test_router_tools_match_declarations() {
        let router = get("router").expect("router agent");
        let declared: Vec<String> = support_function_declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();

        for tool in router.tools {
            assert!(declared.iter().any(|d| d == tool), "undeclared tool {tool}");
        }
    }
}
