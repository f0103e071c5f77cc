//! Support tool definitions and executor for Gemini function calling.
//!
//! Provides the six read-only lookup tools (orders, invoices, FAQs,
//! conversation history) the router agent can use to answer customer
//! questions.

use serde_json::json;
use tracing::instrument;

use crate::db::{
    ConversationRepository, DbPool, FaqRepository, InvoiceRepository, OrderRepository,
};

use super::error::GeminiError;
use super::types::{FunctionDeclaration, Tool};

/// Get the tool set available to the router agent.
#[must_use]
pub fn support_tools() -> Vec<Tool> {
    vec![Tool {
        function_declarations: support_function_declarations(),
    }]
}

/// The six lookup function declarations.
#[must_use]
pub fn support_function_declarations() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration {
            name: "getOrderDetails".to_string(),
            description: "Get full order details by order ID or order number.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "orderId": {
                        "type": "string",
                        "description": "Order ID or order number (e.g., 'ORD-1001')"
                    }
                },
                "required": ["orderId"]
            }),
        },
        FunctionDeclaration {
            name: "checkDeliveryStatus".to_string(),
            description: "Check delivery status and date by order ID or order number.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "orderId": {
                        "type": "string",
                        "description": "Order ID or order number (e.g., 'ORD-1001')"
                    }
                },
                "required": ["orderId"]
            }),
        },
        FunctionDeclaration {
            name: "getInvoiceDetails".to_string(),
            description: "Get invoice details by invoice number.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "invoiceNo": {
                        "type": "string",
                        "description": "Invoice number (e.g., 'INV-2001')"
                    }
                },
                "required": ["invoiceNo"]
            }),
        },
        FunctionDeclaration {
            name: "checkRefundStatus".to_string(),
            description: "Check refund status for an invoice number.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "invoiceNo": {
                        "type": "string",
                        "description": "Invoice number (e.g., 'INV-2001')"
                    }
                },
                "required": ["invoiceNo"]
            }),
        },
        FunctionDeclaration {
            name: "searchProducts".to_string(),
            description: "Search product FAQs using a query string.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search terms matched against question, answer, and category"
                    }
                },
                "required": ["query"]
            }),
        },
        FunctionDeclaration {
            name: "searchConversationHistory".to_string(),
            description: "Search past conversation history by keyword.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Keyword matched against message content"
                    }
                },
                "required": ["query"]
            }),
        },
    ]
}

/// Executor for the support tools.
///
/// Maps function names requested by the model to database lookups.
pub struct ToolExecutor<'a> {
    pool: &'a DbPool,
}

impl<'a> ToolExecutor<'a> {
    /// Create a new tool executor.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Execute a tool and return the result as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tools, invalid input, or a failed lookup.
    #[instrument(skip(self, args), fields(tool_name = %name))]
    pub async fn execute(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        match name {
            "getOrderDetails" => self.get_order_details(args).await,
            "checkDeliveryStatus" => self.check_delivery_status(args).await,
            "getInvoiceDetails" => self.get_invoice_details(args).await,
            "checkRefundStatus" => self.check_refund_status(args).await,
            "searchProducts" => self.search_products(args).await,
            "searchConversationHistory" => self.search_conversation_history(args).await,
            _ => Err(GeminiError::ToolExecution(format!("Unknown tool: {name}"))),
        }
    }

    async fn get_order_details(
        &self,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        let order_id = require_str(args, "orderId")?;

        let order = OrderRepository::new(self.pool)
            .find_by_reference(order_id)
            .await
            .map_err(|e| GeminiError::ToolExecution(format!("Failed to get order: {e}")))?;

        Ok(order.map_or_else(
            || json!({ "error": "Order not found", "orderId": order_id }),
            |order| {
                json!({
                    "id": order.id,
                    "orderNumber": order.order_number,
                    "status": order.status,
                    "deliveryDate": order.delivery_date.map(|d| d.to_rfc3339()),
                    "items": order.items,
                    "createdAt": order.created_at.to_rfc3339(),
                })
            },
        ))
    }

    async fn check_delivery_status(
        &self,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        let order_id = require_str(args, "orderId")?;

        let order = OrderRepository::new(self.pool)
            .find_by_reference(order_id)
            .await
            .map_err(|e| GeminiError::ToolExecution(format!("Failed to get order: {e}")))?;

        Ok(order.map_or_else(
            || json!({ "error": "Order not found", "orderId": order_id }),
            |order| {
                json!({
                    "orderId": order.id,
                    "status": order.status,
                    "deliveryDate": order.delivery_date.map(|d| d.to_rfc3339()),
                })
            },
        ))
    }

    async fn get_invoice_details(
        &self,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        let invoice_no = require_str(args, "invoiceNo")?;

        let invoice = InvoiceRepository::new(self.pool)
            .find_by_number(invoice_no)
            .await
            .map_err(|e| GeminiError::ToolExecution(format!("Failed to get invoice: {e}")))?;

        Ok(invoice.map_or_else(
            || json!({ "error": "Invoice not found", "invoiceNo": invoice_no }),
            |invoice| {
                json!({
                    "id": invoice.id,
                    "invoiceNo": invoice.invoice_no,
                    "amount": invoice.amount.to_string(),
                    "status": invoice.status,
                    "dueDate": invoice.due_date.to_rfc3339(),
                    "createdAt": invoice.created_at.to_rfc3339(),
                })
            },
        ))
    }

    async fn check_refund_status(
        &self,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        let invoice_no = require_str(args, "invoiceNo")?;

        let invoice = InvoiceRepository::new(self.pool)
            .find_by_number(invoice_no)
            .await
            .map_err(|e| GeminiError::ToolExecution(format!("Failed to get invoice: {e}")))?;

        Ok(invoice.map_or_else(
            || json!({ "error": "Invoice not found", "invoiceNo": invoice_no }),
            |invoice| {
                json!({
                    "invoiceNo": invoice.invoice_no,
                    "status": invoice.status,
                    "amount": invoice.amount.to_string(),
                    "dueDate": invoice.due_date.to_rfc3339(),
                    "refunded": invoice.status.is_refunded(),
                })
            },
        ))
    }

    async fn search_products(
        &self,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        let query = require_str(args, "query")?;

        let faqs = FaqRepository::new(self.pool)
            .search(query)
            .await
            .map_err(|e| GeminiError::ToolExecution(format!("Failed to search FAQs: {e}")))?;

        let results: Vec<serde_json::Value> = faqs
            .iter()
            .map(|faq| {
                json!({
                    "id": faq.id,
                    "question": faq.question,
                    "answer": faq.answer,
                    "category": faq.category,
                })
            })
            .collect();

        // functionResponse payloads must be objects, so the list is wrapped.
        Ok(json!({ "results": results }))
    }

    async fn search_conversation_history(
        &self,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, GeminiError> {
        let query = require_str(args, "query")?;

        let messages = ConversationRepository::new(self.pool)
            .search_messages(query)
            .await
            .map_err(|e| GeminiError::ToolExecution(format!("Failed to search history: {e}")))?;

        let results: Vec<serde_json::Value> = messages
            .iter()
            .map(|message| {
                json!({
                    "id": message.id,
                    "role": message.role,
                    "content": message.content,
                    "createdAt": message.created_at.to_rfc3339(),
                })
            })
            .collect();

        Ok(json!({ "results": results }))
    }
}

/// Require a non-empty string argument.
fn require_str<'v>(args: &'v serde_json::Value, key: &str) -> Result<&'v str, GeminiError> {
    args.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            GeminiError::ToolExecution(format!("missing or empty required argument: {key}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::db::test_support::memory_pool;

    #[test]
    fn test_support_tools_count() {
        let declarations = support_function_declarations();
        assert_eq!(declarations.len(), 6);
    }

    #[test]
    fn test_support_tools_names() {
        let declarations = support_function_declarations();
        let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();

        assert!(names.contains(&"getOrderDetails"));
        assert!(names.contains(&"checkDeliveryStatus"));
        assert!(names.contains(&"getInvoiceDetails"));
        assert!(names.contains(&"checkRefundStatus"));
        assert!(names.contains(&"searchProducts"));
        assert!(names.contains(&"searchConversationHistory"));
    }

    #[test]
    fn test_tool_parameters_are_objects() {
        for declaration in support_function_declarations() {
            assert_eq!(declaration.parameters.get("type"), Some(&json!("object")));
        }
    }

    #[tokio::test]
    async fn test_get_order_details_found() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("getOrderDetails", &json!({ "orderId": "ORD-1001" }))
            .await
            .expect("execute");

        assert_eq!(result["orderNumber"], "ORD-1001");
        assert_eq!(result["status"], "DELIVERED");
        assert!(result["items"].is_array());
    }

    #[tokio::test]
    async fn test_get_order_details_not_found() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("getOrderDetails", &json!({ "orderId": "ORD-9999" }))
            .await
            .expect("execute");

        assert_eq!(result["error"], "Order not found");
        assert_eq!(result["orderId"], "ORD-9999");
    }

    #[tokio::test]
    async fn test_check_delivery_status_pending_order() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("checkDeliveryStatus", &json!({ "orderId": "ORD-1003" }))
            .await
            .expect("execute");

        assert_eq!(result["status"], "PENDING");
        assert!(result["deliveryDate"].is_null());
    }

    #[tokio::test]
    async fn test_check_refund_status_refunded_invoice() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("checkRefundStatus", &json!({ "invoiceNo": "INV-2002" }))
            .await
            .expect("execute");

        assert_eq!(result["refunded"], true);
        assert_eq!(result["amount"], "49.99");
    }

    #[tokio::test]
    async fn test_get_invoice_details_not_found() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("getInvoiceDetails", &json!({ "invoiceNo": "INV-9999" }))
            .await
            .expect("execute");

        assert_eq!(result["error"], "Invoice not found");
    }

    #[tokio::test]
    async fn test_search_products_matches_faq() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("searchProducts", &json!({ "query": "return policy" }))
            .await
            .expect("execute");

        let results = result["results"].as_array().expect("results array");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["category"], "Returns");
    }

    #[tokio::test]
    async fn test_search_conversation_history_matches_seeded_message() {
        let pool = memory_pool().await;
        fixtures::seed(&pool).await.expect("seed");

        let result = ToolExecutor::new(&pool)
            .execute("searchConversationHistory", &json!({ "query": "invoice" }))
            .await
            .expect("execute");

        let results = result["results"].as_array().expect("results array");
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let pool = memory_pool().await;

        let result = ToolExecutor::new(&pool)
            .execute("dropTables", &json!({}))
            .await;

        assert!(matches!(result, Err(GeminiError::ToolExecution(_))));
    }

    #[tokio::test]
    async fn test_missing_argument_is_an_error() {
        let pool = memory_pool().await;

        let result = ToolExecutor::new(&pool)
            .execute("getOrderDetails", &json!({}))
            .await;

        assert!(matches!(result, Err(GeminiError::ToolExecution(_))));
    }

    #[tokio::test]
    async fn test_empty_argument_is_an_error() {
        let pool = memory_pool().await;

        let result = ToolExecutor::new(&pool)
            .execute("searchProducts", &json!({ "query": "" }))
            .await;

        assert!(matches!(result, Err(GeminiError::ToolExecution(_))));
    }
}
