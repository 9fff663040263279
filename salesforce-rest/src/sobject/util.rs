use super::json_body;
use crate::client::{Client, Error};
use crate::http::Request;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

/// Untyped REST operations addressed by object name.
///
/// JSON-returning operations yield [`Error::Decode`] when the response body
/// is not JSON. HTTP error statuses are not errors: the server's error body
/// is returned as is.
#[derive(Debug, Clone, Copy)]
pub struct Util<'c> {
    client: &'c Client,
}

impl<'c> Util<'c> {
    pub(crate) fn new(client: &'c Client) -> Self {
        Self { client }
    }

    fn data_path(&self, suffix: &str) -> String {
        format!("/services/data/{}/{}", self.client.version(), suffix)
    }

    async fn get_json(&self, path: String) -> Result<Value, Error> {
        let mut request = Request::new(Method::GET, path);
        json_body(self.client.auth_and_send_request(&mut request).await?)
    }

    /// Lists the API versions offered by the instance.
    ///
    /// This call is not authenticated.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn versions(&self) -> Result<Value, Error> {
        let request = Request::new(Method::GET, "/services/data");
        json_body(self.client.send_request(&request).await?)
    }

    /// Lists the resources available for the configured version.
    pub async fn resources(&self) -> Result<Value, Error> {
        self.get_json(self.data_path("")).await
    }

    /// Lists the objects available to the user.
    pub async fn available_sobjects(&self) -> Result<Value, Error> {
        self.get_json(self.data_path("sobjects/")).await
    }

    /// Describes the fields and metadata of an object.
    pub async fn describe(&self, object_name: &str) -> Result<Value, Error> {
        self.get_json(self.data_path(&format!("sobjects/{object_name}/describe/")))
            .await
    }

    /// Returns the basic metadata and recent items of an object.
    pub async fn basic_object_information(&self, object_name: &str) -> Result<Value, Error> {
        self.get_json(self.data_path(&format!("sobjects/{object_name}/")))
            .await
    }

    /// Runs a SOQL query.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn execute_soql(&self, query: &str) -> Result<Value, Error> {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.get_json(self.data_path(&format!("query?q={encoded}")))
            .await
    }

    /// Retrieves a record by id.
    pub async fn get_object(&self, object_name: &str, id: &str) -> Result<Value, Error> {
        self.get_json(self.data_path(&format!("sobjects/{object_name}/{id}")))
            .await
    }

    /// Creates a record and returns the server's reply (`{"id", "success", "errors"}`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodeBody`] if `data` cannot be represented as JSON.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create_object<T: Serialize + ?Sized>(
        &self,
        object_name: &str,
        data: &T,
    ) -> Result<Value, Error> {
        let body = serde_json::to_value(data).map_err(|source| Error::EncodeBody { source })?;
        let mut request =
            Request::new(Method::POST, self.data_path(&format!("sobjects/{object_name}/")))
                .with_body(body);
        json_body(self.client.auth_and_send_request(&mut request).await?)
    }

    /// Updates a record. Returns true iff the server answered 204.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn update_object<T: Serialize + ?Sized>(
        &self,
        object_name: &str,
        id: &str,
        data: &T,
    ) -> Result<bool, Error> {
        let body = serde_json::to_value(data).map_err(|source| Error::EncodeBody { source })?;
        let mut request = Request::new(
            Method::PATCH,
            self.data_path(&format!("sobjects/{object_name}/{id}")),
        )
        .with_body(body);
        let response = self.client.auth_and_send_request(&mut request).await?;
        Ok(response.status() == 204)
    }

    /// Deletes a record. Returns true iff the server answered 200.
    ///
    /// Salesforce normally answers a successful delete with 204, which this
    /// reports as false.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn delete_object(&self, object_name: &str, id: &str) -> Result<bool, Error> {
        let mut request = Request::new(
            Method::DELETE,
            self.data_path(&format!("sobjects/{object_name}/{id}")),
        );
        let response = self.client.auth_and_send_request(&mut request).await?;
        Ok(response.status() == 200)
    }
}
