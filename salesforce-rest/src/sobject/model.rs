use super::Util;
use crate::client::{Client, Error};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Operations bound to one sObject type.
///
/// # Examples
///
/// ```no_run
/// # use salesforce_rest::client;
/// # use serde_json::json;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let client = client::Builder::new().base_uri("https://login.salesforce.com").build()?;
/// let leads = client.lead();
/// let created = leads.create(&json!({"LastName": "Doe", "Company": "Acme"})).await?;
/// let open = leads
///     .search("Id, Name", &["Status = 'Open'", "IsConverted = false"])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SObject<'c> {
    client: &'c Client,
    name: Arc<str>,
}

impl<'c> SObject<'c> {
    pub(crate) fn new(client: &'c Client, name: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    /// Returns the API name of the object type (e.g. `Account`).
    pub fn name(&self) -> &str {
        &self.name
    }

    fn util(&self) -> Util<'c> {
        Util::new(self.client)
    }

    pub async fn get(&self, id: &str) -> Result<Value, Error> {
        self.util().get_object(&self.name, id).await
    }

    pub async fn create<T: Serialize + ?Sized>(&self, data: &T) -> Result<Value, Error> {
        self.util().create_object(&self.name, data).await
    }

    /// Returns true iff the record was updated.
    pub async fn update<T: Serialize + ?Sized>(&self, id: &str, data: &T) -> Result<bool, Error> {
        self.util().update_object(&self.name, id, data).await
    }

    /// Returns true iff the server answered 200.
    pub async fn delete(&self, id: &str) -> Result<bool, Error> {
        self.util().delete_object(&self.name, id).await
    }

    pub async fn describe(&self) -> Result<Value, Error> {
        self.util().describe(&self.name).await
    }

    pub async fn basic_information(&self) -> Result<Value, Error> {
        self.util().basic_object_information(&self.name).await
    }

    /// Selects `select` from this object, filtered by `conditions` joined with `AND`.
    ///
    /// SOQL has no `SELECT *`, so the field list is always required. An empty
    /// `conditions` slice omits the `WHERE` clause and matches every record.
    pub async fn search<S: AsRef<str>>(
        &self,
        select: &str,
        conditions: &[S],
    ) -> Result<Value, Error> {
        let query = self.query(select).conditions(conditions);
        self.util().execute_soql(&query.to_string()).await
    }

    /// Starts a SOQL query on this object.
    pub fn query(&self, select: &str) -> SoqlQuery {
        SoqlQuery::new(select, &*self.name)
    }
}

/// A `SELECT .. FROM .. WHERE ..` statement.
///
/// Conditions are inserted verbatim and joined with `AND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    select: String,
    from: String,
    conditions: Vec<String>,
}

impl SoqlQuery {
    pub fn new(select: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            from: from.into(),
            conditions: Vec::new(),
        }
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn conditions<S: AsRef<str>>(mut self, conditions: &[S]) -> Self {
        self.conditions
            .extend(conditions.iter().map(|c| c.as_ref().to_string()));
        self
    }
}

impl fmt::Display for SoqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.select, self.from)?;
        if !self.conditions.is_empty() {
            write!(f, " WHERE {}", self.conditions.join(" AND "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenAuthenticator;
    use crate::client::Builder;
    use crate::http::transport::testing::MockTransport;
    use reqwest::Method;
    use serde_json::json;

    fn mock_client(transport: &Arc<MockTransport>) -> Client {
        Builder::new()
            .base_uri("https://x.my.salesforce.com")
            .version("v58.0")
            .transport(transport.clone())
            .authenticator(Arc::new(StaticTokenAuthenticator::new("tok")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_query_without_conditions() {
        let query = SoqlQuery::new("Id, Name", "Account");
        assert_eq!(query.to_string(), "SELECT Id, Name FROM Account");
    }

    #[test]
    fn test_query_with_conditions() {
        let query = SoqlQuery::new("Id", "Lead")
            .condition("Status = 'Open'")
            .conditions(&["IsConverted = false", "Email != null"]);
        assert_eq!(
            query.to_string(),
            "SELECT Id FROM Lead WHERE Status = 'Open' AND IsConverted = false AND Email != null"
        );
    }

    #[test]
    fn test_named_accessors() {
        let transport = Arc::new(MockTransport::new());
        let client = mock_client(&transport);
        assert_eq!(client.lead().name(), "Lead");
        assert_eq!(client.account().name(), "Account");
        assert_eq!(client.opportunity().name(), "Opportunity");
        assert_eq!(client.sobject("Custom__c").name(), "Custom__c");
    }

    #[tokio::test]
    async fn test_search_builds_soql() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({"totalSize": 1, "done": true, "records": [{"Id": "006xx"}]}),
        );
        let client = mock_client(&transport);

        let result = client
            .opportunity()
            .search("Id", &["StageName = 'Closed Won'", "Amount > 1000"])
            .await
            .unwrap();
        assert_eq!(result["records"][0]["Id"], "006xx");

        let sent = &transport.requests()[0];
        assert_eq!(
            sent.url,
            "https://x.my.salesforce.com/services/data/v58.0/query?q=\
             SELECT+Id+FROM+Opportunity+WHERE+StageName+%3D+%27Closed+Won%27+AND+Amount+%3E+1000"
        );
    }

    #[tokio::test]
    async fn test_search_without_conditions() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"totalSize": 0, "done": true, "records": []}));
        let client = mock_client(&transport);

        let result = client.account().search("Id", &[] as &[&str]).await.unwrap();
        assert_eq!(result["totalSize"], 0);
        assert_eq!(
            transport.requests()[0].url,
            "https://x.my.salesforce.com/services/data/v58.0/query?q=SELECT+Id+FROM+Account"
        );
    }

    #[tokio::test]
    async fn test_crud_delegates_with_object_name() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"Id": "001xx"}))
            .push_json(201, json!({"id": "001yy", "success": true}))
            .push_empty(204)
            .push_empty(200)
            .push_json(200, json!({"name": "Account"}))
            .push_json(200, json!({"objectDescribe": {}}));
        let client = mock_client(&transport);
        let account = client.account();

        assert_eq!(account.get("001xx").await.unwrap()["Id"], "001xx");
        assert_eq!(account.create(&json!({"Name": "Acme"})).await.unwrap()["success"], true);
        assert!(account.update("001yy", &json!({"Name": "Acme 2"})).await.unwrap());
        assert!(account.delete("001yy").await.unwrap());
        assert_eq!(account.describe().await.unwrap()["name"], "Account");
        assert!(account.basic_information().await.unwrap()["objectDescribe"].is_object());

        let requests = transport.requests();
        let methods: Vec<&Method> = requests.iter().map(|r| &r.method).collect();
        assert_eq!(
            methods,
            vec![
                &Method::GET,
                &Method::POST,
                &Method::PATCH,
                &Method::DELETE,
                &Method::GET,
                &Method::GET
            ]
        );
        assert!(requests
            .iter()
            .all(|r| r.url.contains("/services/data/v58.0/sobjects/Account/")));
        assert!(requests
            .iter()
            .all(|r| r.headers["Authorization"] == "Bearer tok"));
    }
}
