//! Resource facades.
//!
//! Only the properties the SDK itself needs are typed here; everything else
//! stays reachable through [`Resource::data`].

use super::{Resource, ResourceData, ResourceStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;

fn status_of(data: &ResourceData) -> Option<ResourceStatus> {
    data.get_string("status")?.parse().ok()
}

/// A user account.
#[derive(Debug, Clone)]
pub struct Account {
    data: ResourceData,
}

impl Resource for Account {
    const TYPE_NAME: &'static str = "Account";

    fn from_data(data: ResourceData) -> Self {
        Self { data }
    }

    fn data(&self) -> &ResourceData {
        &self.data
    }
}

impl Account {
    pub fn username(&self) -> Option<String> {
        self.data.get_string("username")
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.data.set("username", Value::String(username.into()));
    }

    pub fn email(&self) -> Option<String> {
        self.data.get_string("email")
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.data.set("email", Value::String(email.into()));
    }

    pub fn given_name(&self) -> Option<String> {
        self.data.get_string("givenName")
    }

    pub fn set_given_name(&self, given_name: impl Into<String>) {
        self.data.set("givenName", Value::String(given_name.into()));
    }

    pub fn surname(&self) -> Option<String> {
        self.data.get_string("surname")
    }

    pub fn set_surname(&self, surname: impl Into<String>) {
        self.data.set("surname", Value::String(surname.into()));
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.data.set("password", Value::String(password.into()));
    }

    pub fn status(&self) -> Option<ResourceStatus> {
        status_of(&self.data)
    }

    pub fn set_status(&self, status: ResourceStatus) {
        self.data.set("status", status.as_str());
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.data.get_datetime("createdAt")
    }

    /// Href of the directory owning this account.
    pub fn directory_href(&self) -> Option<String> {
        self.data.link("directory")
    }
}

/// A group of accounts.
#[derive(Debug, Clone)]
pub struct Group {
    data: ResourceData,
}

impl Resource for Group {
    const TYPE_NAME: &'static str = "Group";

    fn from_data(data: ResourceData) -> Self {
        Self { data }
    }

    fn data(&self) -> &ResourceData {
        &self.data
    }
}

impl Group {
    pub fn name(&self) -> Option<String> {
        self.data.get_string("name")
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.data.set("name", Value::String(name.into()));
    }

    pub fn description(&self) -> Option<String> {
        self.data.get_string("description")
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.data.set("description", Value::String(description.into()));
    }

    pub fn status(&self) -> Option<ResourceStatus> {
        status_of(&self.data)
    }

    pub fn set_status(&self, status: ResourceStatus) {
        self.data.set("status", status.as_str());
    }
}

/// A directory of accounts and groups.
#[derive(Debug, Clone)]
pub struct Directory {
    data: ResourceData,
}

impl Resource for Directory {
    const TYPE_NAME: &'static str = "Directory";

    fn from_data(data: ResourceData) -> Self {
        Self { data }
    }

    fn data(&self) -> &ResourceData {
        &self.data
    }
}

impl Directory {
    pub fn name(&self) -> Option<String> {
        self.data.get_string("name")
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.data.set("name", Value::String(name.into()));
    }

    pub fn description(&self) -> Option<String> {
        self.data.get_string("description")
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.data.set("description", Value::String(description.into()));
    }

    pub fn status(&self) -> Option<ResourceStatus> {
        status_of(&self.data)
    }

    pub fn set_status(&self, status: ResourceStatus) {
        self.data.set("status", status.as_str());
    }

    /// Href of this directory's account collection.
    pub fn accounts_href(&self) -> Option<String> {
        self.data.link("accounts")
    }
}

/// An application accounts log in to.
#[derive(Debug, Clone)]
pub struct Application {
    data: ResourceData,
}

impl Resource for Application {
    const TYPE_NAME: &'static str = "Application";

    fn from_data(data: ResourceData) -> Self {
        Self { data }
    }

    fn data(&self) -> &ResourceData {
        &self.data
    }
}

impl Application {
    pub fn name(&self) -> Option<String> {
        self.data.get_string("name")
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.data.set("name", Value::String(name.into()));
    }

    pub fn description(&self) -> Option<String> {
        self.data.get_string("description")
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.data.set("description", Value::String(description.into()));
    }

    pub fn status(&self) -> Option<ResourceStatus> {
        status_of(&self.data)
    }

    pub fn set_status(&self, status: ResourceStatus) {
        self.data.set("status", status.as_str());
    }

    pub fn accounts_href(&self) -> Option<String> {
        self.data.link("accounts")
    }
}

/// An organization grouping directories and groups.
#[derive(Debug, Clone)]
pub struct Organization {
    data: ResourceData,
}

impl Resource for Organization {
    const TYPE_NAME: &'static str = "Organization";

    fn from_data(data: ResourceData) -> Self {
        Self { data }
    }

    fn data(&self) -> &ResourceData {
        &self.data
    }
}

impl Organization {
    pub fn name(&self) -> Option<String> {
        self.data.get_string("name")
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.data.set("name", Value::String(name.into()));
    }

    pub fn name_key(&self) -> Option<String> {
        self.data.get_string("nameKey")
    }

    pub fn set_name_key(&self, name_key: impl Into<String>) {
        self.data.set("nameKey", Value::String(name_key.into()));
    }

    pub fn status(&self) -> Option<ResourceStatus> {
        status_of(&self.data)
    }

    pub fn set_status(&self, status: ResourceStatus) {
        self.data.set("status", status.as_str());
    }
}

/// The tenant owning the API key. Lives for the whole client lifetime.
#[derive(Debug, Clone)]
pub struct Tenant {
    data: ResourceData,
}

impl Resource for Tenant {
    const TYPE_NAME: &'static str = "Tenant";
    const STORE_INFINITELY: bool = true;

    fn from_data(data: ResourceData) -> Self {
        Self { data }
    }

    fn data(&self) -> &ResourceData {
        &self.data
    }
}

impl Tenant {
    pub fn name(&self) -> Option<String> {
        self.data.get_string("name")
    }

    pub fn key(&self) -> Option<String> {
        self.data.get_string("key")
    }

    pub fn applications_href(&self) -> Option<String> {
        self.data.link("applications")
    }

    pub fn directories_href(&self) -> Option<String> {
        self.data.link("directories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_accessors() {
        let account = Account::from_data(ResourceData::from_properties(
            json!({
                "href": "https://api.example.com/v1/accounts/1",
                "email": "jane@example.com",
                "status": "UNVERIFIED",
                "directory": {"href": "https://api.example.com/v1/directories/9"}
            })
            .as_object()
            .unwrap()
            .clone(),
        ));

        assert_eq!(account.email().as_deref(), Some("jane@example.com"));
        assert_eq!(account.status(), Some(ResourceStatus::Unverified));
        assert_eq!(
            account.directory_href().as_deref(),
            Some("https://api.example.com/v1/directories/9")
        );
    }

    #[test]
    fn test_unknown_status_reads_as_none() {
        let group = Group::instantiate();
        group.data().set("status", "ARCHIVED");
        assert_eq!(group.status(), None);
    }

    #[test]
    fn test_tenant_is_stored_infinitely() {
        assert!(Tenant::STORE_INFINITELY);
        assert!(!Account::STORE_INFINITELY);
    }
}
