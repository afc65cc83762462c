use chrono::Utc;
use tracing::info;

use super::RockAutoClient;
use crate::config::{ACCOUNT_ACTIVITY_URL, ORDER_HISTORY_URL, PROFILE_URL};
use crate::error::Result;
use crate::models::{
    AccountActivityResult, ExternalOrderRequest, OrderHistoryFilter, OrderHistoryResult,
    SavedAddressesResult, SavedVehiclesResult,
};
use crate::pages::account::{
    external_order_added, parse_activity_flags, parse_order_history, parse_saved_addresses,
    parse_saved_vehicles,
};
use crate::pages::page_input;
use crate::session::{RequestKind, Transport};

/// Signed-in operations. Each checks the session before touching the network.
impl<T: Transport> RockAutoClient<T> {
    pub async fn saved_addresses(&self) -> Result<SavedAddressesResult> {
        self.session.require_auth("Saved addresses")?;
        let page = self.session.get(PROFILE_URL).await?;
        let addresses = parse_saved_addresses(&page.body);
        info!("Found {} saved addresses", addresses.len());
        Ok(SavedAddressesResult { addresses })
    }

    pub async fn saved_vehicles(&self) -> Result<SavedVehiclesResult> {
        self.session.require_auth("Saved vehicles")?;
        let page = self.session.get(PROFILE_URL).await?;
        let vehicles = parse_saved_vehicles(&page.body);
        info!("Found {} saved vehicles", vehicles.len());
        Ok(SavedVehiclesResult { vehicles })
    }

    /// Addresses and vehicles from the profile page, feature flags from the
    /// account-activity page.
    pub async fn account_activity(&self) -> Result<AccountActivityResult> {
        self.session.require_auth("Account activity")?;

        let profile = self.session.get(PROFILE_URL).await?;
        let saved_addresses = SavedAddressesResult {
            addresses: parse_saved_addresses(&profile.body),
        };
        let saved_vehicles = SavedVehiclesResult {
            vehicles: parse_saved_vehicles(&profile.body),
        };

        let activity = self.session.get(ACCOUNT_ACTIVITY_URL).await?;
        let flags = parse_activity_flags(&activity.body);

        Ok(AccountActivityResult {
            saved_addresses,
            saved_vehicles,
            has_discount_codes: flags.has_discount_codes,
            has_store_credit: flags.has_store_credit,
            has_alerts: flags.has_alerts,
            last_updated: Utc::now(),
        })
    }

    /// The filter is echoed back in the result; the history page itself is
    /// fetched unfiltered.
    pub async fn order_history(&self, filter: Option<OrderHistoryFilter>) -> Result<OrderHistoryResult> {
        self.session.require_auth("Order history")?;
        let filter = filter.unwrap_or_default();
        info!("Fetching order history ({})", filter.date_range);

        let page = self.session.get(ORDER_HISTORY_URL).await?;
        let orders = parse_order_history(&page.body);

        info!("Found {} orders", orders.len());
        Ok(OrderHistoryResult {
            orders,
            filter_applied: filter,
            search_time: Utc::now(),
        })
    }

    /// Links an order placed under another email or phone to this account.
    pub async fn add_external_order(&self, email_or_phone: &str, order_number: &str) -> Result<bool> {
        self.session.require_auth("Adding external orders")?;
        let request = ExternalOrderRequest::new(email_or_phone, order_number)?;
        info!("Adding external order {}", request.order_number);

        let page = self.session.get(ACCOUNT_ACTIVITY_URL).await?;
        let mut form = vec![
            ("email_or_phone".to_string(), request.email_or_phone.clone()),
            ("order_number".to_string(), request.order_number.to_string()),
            ("add_external_order".to_string(), "1".to_string()),
        ];
        if let Some(token) = page_input(&page.body, "_nck").filter(|t| !t.is_empty()) {
            form.push(("_nck".to_string(), token));
        }

        let response = self
            .session
            .post(
                ACCOUNT_ACTIVITY_URL,
                &form,
                RequestKind::Document,
                Some(ACCOUNT_ACTIVITY_URL),
            )
            .await?;
        Ok(external_order_added(&response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{PageTransport, client, field};
    use crate::error::ClientError;
    use crate::models::DateRange;

    const LOGIN_OK: &str = r#"{"message":"Log In Successful","email":"a@b.com","act":"login"}"#;

    async fn signed_in(transport: PageTransport) -> RockAutoClient<PageTransport> {
        let client = client(transport.with("catalogapi.php", LOGIN_OK));
        assert!(client.login("a@b.com", "pw", false).await.unwrap());
        client
    }

    #[tokio::test]
    async fn every_account_call_needs_login() {
        let client = client(PageTransport::default());

        let results = [
            client.saved_addresses().await.map(|_| ()),
            client.saved_vehicles().await.map(|_| ()),
            client.account_activity().await.map(|_| ()),
            client.order_history(None).await.map(|_| ()),
            client.add_external_order("a@b.com", "123").await.map(|_| ()),
        ];
        for result in results {
            assert!(matches!(result, Err(ClientError::AuthenticationRequired(_))));
        }
        assert_eq!(client.session().transport().count(), 0);
    }

    #[tokio::test]
    async fn activity_combines_profile_and_flags() {
        let profile = r#"<div><h3 aria-label="Saved Vehicles">Saved Vehicles</h3><table>
            <tr><td><a href="/en/catalog/ford,2017,f-150,3.5l+v6,3364289">2017 FORD F-150</a></td><td></td></tr>
        </table></div>"#;
        let transport = PageTransport::default()
            .with("/en/profile/", profile)
            .with("/en/accountactivity/", "<h2>Store Credit</h2>");
        let client = signed_in(transport).await;

        let activity = client.account_activity().await.unwrap();
        assert_eq!(activity.saved_vehicles.count(), 1);
        assert_eq!(activity.saved_addresses.count(), 0);
        assert!(activity.has_store_credit);
        assert!(!activity.has_alerts);
    }

    #[tokio::test]
    async fn history_echoes_filter() {
        let page = r#"<table><tr><th>Order</th><th>Date</th><th>Status</th></tr>
            <tr><td>1001</td><td>01/05/2024</td><td>Shipped</td></tr></table>"#;
        let client = signed_in(PageTransport::default().with("/en/orderhistory/", page)).await;

        let filter = OrderHistoryFilter {
            date_range: DateRange::OneYear,
            ..OrderHistoryFilter::default()
        };
        let history = client.order_history(Some(filter.clone())).await.unwrap();
        assert_eq!(history.count(), 1);
        assert_eq!(history.filter_applied, filter);
    }

    #[tokio::test]
    async fn external_order_sends_token_when_present() {
        let transport = PageTransport::default().with(
            "/en/accountactivity/",
            r#"<input name="_nck" value="acct-tok"><p>Order added</p>"#,
        );
        let client = signed_in(transport).await;

        assert!(client.add_external_order("x@y.com", "555").await.unwrap());
        let form = client.session().transport().form_of("/en/accountactivity/");
        assert_eq!(field(&form, "_nck"), Some("acct-tok"));
        assert_eq!(field(&form, "order_number"), Some("555"));
    }

    #[tokio::test]
    async fn external_order_validates_after_auth() {
        let client = signed_in(PageTransport::default()).await;
        let err = client.add_external_order("x@y.com", "55A").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
