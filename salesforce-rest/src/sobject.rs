//! Record operations over sObjects.
//!
//! [`Util`] issues the raw REST calls (describe, SOQL, CRUD by object name).
//! [`SObject`] binds those calls to one object type such as `Account`.
//! Both borrow the [`Client`] and are cheap to create.
//!
//! Named resources are resolved through the client's registry:
//!
//! ```no_run
//! use salesforce_rest::client;
//! use salesforce_rest::sobject::Resource;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = client::Builder::new().base_uri("https://login.salesforce.com").build()?;
//! if let Some(Resource::SObject(lead)) = client.resource("lead") {
//!     let fields = lead.describe().await?;
//!     println!("{fields}");
//! }
//! # Ok(())
//! # }
//! ```

mod model;
mod util;

pub use model::{SObject, SoqlQuery};
pub use util::Util;

use crate::client::{Client, Error};
use crate::http::{Body, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// What a registered name resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// The untyped [`Util`] operations.
    Util,
    /// An [`SObject`] handle for the named object type.
    SObject(Arc<str>),
}

impl ResourceKind {
    pub fn sobject(name: impl Into<Arc<str>>) -> Self {
        ResourceKind::SObject(name.into())
    }
}

/// A resolved resource handle.
#[derive(Debug, Clone)]
pub enum Resource<'c> {
    Util(Util<'c>),
    SObject(SObject<'c>),
}

type Constructor = Box<dyn Fn() -> ResourceKind + Send + Sync>;

/// Maps resource names to constructors.
///
/// Each name is constructed on first lookup and cached for the lifetime of
/// the owning client.
pub(crate) struct Registry {
    constructors: HashMap<String, Constructor>,
    resolved: Mutex<HashMap<String, ResourceKind>>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
            resolved: Mutex::new(HashMap::new()),
        };
        registry.register_with("util", || ResourceKind::Util);
        registry.register_with("lead", || ResourceKind::sobject("Lead"));
        registry.register_with("account", || ResourceKind::sobject("Account"));
        registry.register_with("opportunity", || ResourceKind::sobject("Opportunity"));
        registry
    }
}

impl Registry {
    pub(crate) fn register(&mut self, name: impl Into<String>, kind: ResourceKind) {
        self.register_with(name, move || kind.clone());
    }

    fn register_with<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> ResourceKind + Send + Sync + 'static,
    {
        let name = name.into();
        self.resolved
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&name);
        self.constructors.insert(name, Box::new(constructor));
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<ResourceKind> {
        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(kind) = resolved.get(name) {
            return Some(kind.clone());
        }
        let kind = (self.constructors.get(name)?)();
        resolved.insert(name.to_string(), kind.clone());
        Some(kind)
    }

    #[cfg(test)]
    fn resolved_count(&self) -> usize {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

impl Client {
    /// Returns the untyped record operations.
    pub fn util(&self) -> Util<'_> {
        Util::new(self)
    }

    /// Returns a handle for the named sObject type (e.g. `Contact`).
    pub fn sobject(&self, name: impl Into<Arc<str>>) -> SObject<'_> {
        SObject::new(self, name)
    }

    /// Returns the sObject registered as `lead` (`Lead` unless overridden).
    pub fn lead(&self) -> SObject<'_> {
        self.registered_sobject("lead", "Lead")
    }

    /// Returns the sObject registered as `account` (`Account` unless overridden).
    pub fn account(&self) -> SObject<'_> {
        self.registered_sobject("account", "Account")
    }

    /// Returns the sObject registered as `opportunity` (`Opportunity` unless overridden).
    pub fn opportunity(&self) -> SObject<'_> {
        self.registered_sobject("opportunity", "Opportunity")
    }

    /// Resolves `name` through the registry, falling back to `object` when the
    /// name is registered as something other than an sObject.
    fn registered_sobject(&self, name: &str, object: &'static str) -> SObject<'_> {
        match self.resources.resolve(name) {
            Some(ResourceKind::SObject(registered)) => self.sobject(registered),
            _ => self.sobject(object),
        }
    }

    /// Resolves a registered resource by name.
    ///
    /// `util`, `lead`, `account` and `opportunity` are always registered;
    /// more can be added with [`Builder::resource`](crate::client::Builder::resource).
    /// Returns `None` for unknown names.
    pub fn resource(&self, name: &str) -> Option<Resource<'_>> {
        Some(match self.resources.resolve(name)? {
            ResourceKind::Util => Resource::Util(self.util()),
            ResourceKind::SObject(object) => Resource::SObject(self.sobject(object)),
        })
    }
}

/// Extracts the JSON body of a record operation response.
pub(crate) fn json_body(response: Response) -> Result<Value, Error> {
    let status = response.status();
    match response.into_body() {
        Body::Json(value) => Ok(value),
        Body::Text(_) | Body::InvalidJson(_) => Err(Error::Decode { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Builder;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    #[test]
    fn test_default_registry() {
        let registry = Registry::default();
        assert_eq!(registry.resolve("util"), Some(ResourceKind::Util));
        assert_eq!(registry.resolve("lead"), Some(ResourceKind::sobject("Lead")));
        assert_eq!(registry.resolve("account"), Some(ResourceKind::sobject("Account")));
        assert_eq!(
            registry.resolve("opportunity"),
            Some(ResourceKind::sobject("Opportunity"))
        );
        assert_eq!(registry.resolve("contact"), None);
    }

    #[test]
    fn test_registry_constructs_once() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut registry = Registry::default();
        let counter = calls.clone();
        registry.register_with("case", move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            ResourceKind::sobject("Case")
        });

        assert_eq!(registry.resolved_count(), 0);
        for _ in 0..3 {
            assert_eq!(registry.resolve("case"), Some(ResourceKind::sobject("Case")));
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(registry.resolved_count(), 1);
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = Registry::default();
        assert_eq!(registry.resolve("lead"), Some(ResourceKind::sobject("Lead")));
        registry.register("lead", ResourceKind::sobject("Lead__c"));
        assert_eq!(registry.resolve("lead"), Some(ResourceKind::sobject("Lead__c")));
    }

    #[test]
    fn test_named_accessors_follow_registry() {
        let client = Builder::new()
            .base_uri("https://x.my.salesforce.com")
            .resource("lead", ResourceKind::sobject("Lead__c"))
            .resource("account", ResourceKind::Util)
            .build()
            .unwrap();

        assert_eq!(client.lead().name(), "Lead__c");
        assert_eq!(client.account().name(), "Account");
        assert_eq!(client.opportunity().name(), "Opportunity");
        match client.resource("lead") {
            Some(Resource::SObject(lead)) => assert_eq!(lead.name(), "Lead__c"),
            other => panic!("unexpected resource: {other:?}"),
        }
        assert_eq!(client.resources.resolved_count(), 3);
    }

    #[test]
    fn test_client_resource_lookup() {
        let client = Builder::new()
            .base_uri("https://x.my.salesforce.com")
            .resource("contact", ResourceKind::sobject("Contact"))
            .build()
            .unwrap();

        assert!(matches!(client.resource("util"), Some(Resource::Util(_))));
        match client.resource("account") {
            Some(Resource::SObject(account)) => assert_eq!(account.name(), "Account"),
            other => panic!("unexpected resource: {other:?}"),
        }
        match client.resource("contact") {
            Some(Resource::SObject(contact)) => assert_eq!(contact.name(), "Contact"),
            other => panic!("unexpected resource: {other:?}"),
        }
        assert!(client.resource("nonexistent").is_none());
    }

    #[test]
    fn test_json_body() {
        let ok = Response::new(200, Body::Json(json!({"a": 1})), HeaderMap::new());
        assert_eq!(json_body(ok).unwrap(), json!({"a": 1}));

        let text = Response::new(502, Body::Text("Bad Gateway".to_string()), HeaderMap::new());
        assert!(matches!(json_body(text), Err(Error::Decode { status: 502 })));

        let invalid = Response::new(200, Body::InvalidJson("{".to_string()), HeaderMap::new());
        assert!(matches!(json_body(invalid), Err(Error::Decode { status: 200 })));
    }
}
