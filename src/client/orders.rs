use tracing::{info, warn};

use super::RockAutoClient;
use crate::config::{ORDER_STATUS_HANDLER, ORDER_STATUS_URL};
use crate::error::{ClientError, Result};
use crate::models::{
    OrderListMethod, OrderListRequest, OrderLookupRequest, OrderStatusError, OrderStatusResult,
};
use crate::pages::order::{classify_order_error, order_list_sent, parse_order_error, parse_order_status};
use crate::pages::page_input;
use crate::session::{RequestKind, Transport, lock};

fn pairs(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl<T: Transport> RockAutoClient<T> {
    /// Looks up an order by the contact it was placed with.
    ///
    /// Bad input is an `Err`. Once the input is valid every outcome,
    /// including transport failures, comes back as an [`OrderStatusResult`].
    pub async fn lookup_order_status(
        &self,
        email_or_phone: &str,
        order_number: &str,
    ) -> Result<OrderStatusResult> {
        let request = OrderLookupRequest::new(email_or_phone, order_number)?;
        info!("Looking up order {}", request.order_number);

        match self.submit_order_lookup(&request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!("Order lookup for {} failed: {}", request.order_number, e);
                Ok(OrderStatusResult::failed(OrderStatusError::system_error(
                    format!("Order lookup failed: {e}"),
                )))
            }
        }
    }

    async fn submit_order_lookup(&self, request: &OrderLookupRequest) -> Result<OrderStatusResult> {
        let page = self.session.get(ORDER_STATUS_URL).await?;
        let Some(token) = page_input(&page.body, "_nck") else {
            return Ok(OrderStatusResult::failed(OrderStatusError::system_error(
                "Could not find security token on order status page",
            )));
        };

        let form = pairs(&[
            ("_nck", token.as_str()),
            ("action", "lookup"),
            ("emailorphone", request.email_or_phone.as_str()),
            ("ordernum", request.order_number.as_str()),
            ("lookup", "Find Order"),
        ]);
        let response = self
            .session
            .post(
                ORDER_STATUS_HANDLER,
                &form,
                RequestKind::Document,
                Some(ORDER_STATUS_URL),
            )
            .await?;

        let limits = lock(&self.config).order_limits.clone();
        if let Some(order) = parse_order_status(&response.body, &request.order_number, &limits) {
            info!(
                "Order {} is '{}' with {} items",
                order.order_number,
                order.status,
                order.item_count()
            );
            return Ok(OrderStatusResult::found(order));
        }

        let message = parse_order_error(&response.body);
        Ok(OrderStatusResult::failed(classify_order_error(
            &message,
            &request.order_number,
        )))
    }

    /// Asks the site to send the list of orders placed with `contact`.
    pub async fn request_order_list(&self, method: OrderListMethod, contact: &str) -> Result<bool> {
        let request = OrderListRequest::new(method, contact)?;
        info!("Requesting order list by {:?}", request.method);

        let page = self.session.get(ORDER_STATUS_URL).await?;
        let token = page_input(&page.body, "_nck").ok_or_else(|| {
            ClientError::UnexpectedResponse {
                url: ORDER_STATUS_URL.to_string(),
                message: "missing form token".to_string(),
            }
        })?;
        let timestamp = page_input(&page.body, "timestamp").unwrap_or_default();

        let (method_value, contact_field) = match request.method {
            OrderListMethod::Email => ("email", "emailaddrsend"),
            OrderListMethod::Sms => ("mms", "mmsnumbersend"),
        };
        let form = pairs(&[
            ("_nck", token.as_str()),
            ("action", "sendorders"),
            ("sendordermethod", method_value),
            (contact_field, request.contact.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let response = self
            .session
            .post(
                ORDER_STATUS_HANDLER,
                &form,
                RequestKind::Document,
                Some(ORDER_STATUS_URL),
            )
            .await?;
        Ok(order_list_sent(&response.body))
    }
}
