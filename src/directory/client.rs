//! Microsoft Graph client for directory role and administrative unit lookups.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;
use uuid::Uuid;

use super::models::{
    AdministrativeUnit, CollectionPage, DeviceDetails, DirectoryObjectRef, GroupDetails, ObjectId,
    RoleAssignment, RoleDefinition, UserDetails,
};
use super::DirectoryClient;
use crate::auth::session::GraphSession;
use crate::config::Config;
use crate::error::GraphError;

/// Fields requested for user members.
const USER_SELECT: &str = "displayName,userPrincipalName,userType,jobTitle,accountEnabled";
const GROUP_SELECT: &str = "displayName,mail";
const DEVICE_SELECT: &str = "displayName,operatingSystem";

/// Upper bound on followed `@odata.nextLink` pages for one collection.
const MAX_PAGES: usize = 1000;

/// Graph directory client bound to one authenticated session.
pub struct GraphDirectory {
    http_client: Client,
    base_url: String,
    session: GraphSession,
}

impl GraphDirectory {
    /// Create a client for the configured Graph endpoint, owning `session` for its lifetime.
    pub fn new(config: &Config, session: GraphSession) -> Result<Self, GraphError> {
        debug!("Opening Graph directory client ({:?})", session.source());
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| GraphError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api.graph_base_url.clone(),
            session,
        })
    }

    /// End the session. The token is wiped when the session drops.
    pub fn close(self) {
        self.session.close();
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, GraphError> {
        build_url(&self.base_url, path, query)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GraphError> {
        let resource = url.path().to_string();
        debug!("GET {}", resource);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.session.access_token())
            .header("client-request-id", Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| GraphError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if let Err(e) = check_status(status, &resource) {
            let body = response.text().await.unwrap_or_default();
            debug!("Graph error body for {}: {}", resource, body);
            return Err(e);
        }

        response
            .json()
            .await
            .map_err(|e| GraphError::ParseFailed(e.to_string()))
    }

    /// Fetch every page of a collection, following `@odata.nextLink`.
    async fn get_collection<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, GraphError> {
        let mut items = Vec::new();
        let mut next = Some(url);
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                error!("Collection exceeded {} pages, aborting", MAX_PAGES);
                return Err(GraphError::RequestFailed(format!(
                    "more than {} result pages",
                    MAX_PAGES
                )));
            }

            let page: CollectionPage<T> = self.get_json(url).await?;
            items.extend(page.value);

            if let Some(link) = page.next_link {
                next = Some(Url::parse(&link).map_err(|e| GraphError::ParseFailed(e.to_string()))?);
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl DirectoryClient for GraphDirectory {
    async fn current_principal_id(&self) -> Result<String, GraphError> {
        let me: ObjectId = self.get_json(self.url("/me", &[("$select", "id")])?).await?;
        Ok(me.id)
    }

    async fn resolve_principal_id(&self, subject: &str) -> Result<String, GraphError> {
        let path = format!("/users/{}", urlencoding::encode(subject));
        let user: ObjectId = self.get_json(self.url(&path, &[("$select", "id")])?).await?;
        Ok(user.id)
    }

    async fn list_role_assignments(
        &self,
        principal_id: &str,
    ) -> Result<Vec<RoleAssignment>, GraphError> {
        let filter = format!("principalId eq '{}'", principal_id.replace('\'', "''"));
        let url = self.url(
            "/roleManagement/directory/roleAssignments",
            &[("$filter", filter.as_str())],
        )?;

        let assignments: Vec<RoleAssignment> = self.get_collection(url).await?;
        info!("Found {} role assignments", assignments.len());
        Ok(assignments)
    }

    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, GraphError> {
        let path = format!(
            "/roleManagement/directory/roleDefinitions/{}",
            urlencoding::encode(id)
        );
        self.get_json(self.url(&path, &[])?).await
    }

    async fn get_administrative_unit(&self, id: &str) -> Result<AdministrativeUnit, GraphError> {
        if id.is_empty() {
            return Err(GraphError::NotFound("administrativeUnits/".to_string()));
        }
        let path = format!("/directory/administrativeUnits/{}", urlencoding::encode(id));
        self.get_json(self.url(&path, &[("$select", "id,displayName")])?)
            .await
    }

    async fn list_administrative_unit_members(
        &self,
        au_id: &str,
    ) -> Result<Vec<DirectoryObjectRef>, GraphError> {
        let path = format!(
            "/directory/administrativeUnits/{}/members",
            urlencoding::encode(au_id)
        );
        self.get_collection(self.url(&path, &[])?).await
    }

    async fn get_user_details(&self, id: &str) -> Result<UserDetails, GraphError> {
        let path = format!("/users/{}", urlencoding::encode(id));
        self.get_json(self.url(&path, &[("$select", USER_SELECT)])?)
            .await
    }

    async fn get_group_details(&self, id: &str) -> Result<GroupDetails, GraphError> {
        let path = format!("/groups/{}", urlencoding::encode(id));
        self.get_json(self.url(&path, &[("$select", GROUP_SELECT)])?)
            .await
    }

    async fn get_device_details(&self, id: &str) -> Result<DeviceDetails, GraphError> {
        let path = format!("/devices/{}", urlencoding::encode(id));
        self.get_json(self.url(&path, &[("$select", DEVICE_SELECT)])?)
            .await
    }
}

fn build_url(base_url: &str, path: &str, query: &[(&str, &str)]) -> Result<Url, GraphError> {
    let mut url = Url::parse(&format!("{}{}", base_url, path))
        .map_err(|e| GraphError::RequestFailed(format!("invalid URL: {}", e)))?;

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Map an HTTP status to the Graph error taxonomy.
fn check_status(status: u16, resource: &str) -> Result<(), GraphError> {
    match status {
        200 => Ok(()),
        401 => Err(GraphError::Unauthorized),
        403 => Err(GraphError::Forbidden),
        404 => Err(GraphError::NotFound(resource.to_string())),
        429 => Err(GraphError::RateLimited),
        // Don't expose raw API error details - just the status code
        status => Err(GraphError::RequestFailed(format!("HTTP {}", status))),
    }
}
