use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::api::controller_config_dto::ControllerConfigDto;
use crate::api::flow_dto::{FlowBatchDto, FlowBatchResponseDto, FlowRuleDto};
use crate::domain::controller::flow_controller::{FlowController, FlowHandle};
use crate::domain::flow::flow_rule::FlowRule;
use crate::domain::utils::id::{DeviceId, FlowId};
use crate::error::{Error, Result};

#[derive(Debug)]
pub enum OnosEndpoint {
    Flows,
    Flow(FlowHandle),
}

impl OnosEndpoint {
    pub fn path(&self) -> String {
        match self {
            Self::Flows => "/onos/v1/flows".to_string(),
            Self::Flow(handle) => format!("/onos/v1/flows/{}/{}", handle.device_id, handle.flow_id),
        }
    }
}

/// Flow controller backed by the ONOS REST API.
#[derive(Debug)]
pub struct OnosFlowController {
    base_url: String,
    user: String,
    password: String,
    client: reqwest::Client,
}

impl OnosFlowController {
    pub fn new(config: &ControllerConfigDto) -> Result<Self> {
        Ok(Self::with_client(config, Self::client_builder(config).build()?))
    }

    fn client_builder(config: &ControllerConfigDto) -> reqwest::ClientBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder().default_headers(headers).timeout(Duration::from_millis(config.timeout_ms))
    }

    fn with_client(config: &ControllerConfigDto, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            client,
        }
    }

    fn url(&self, endpoint: &OnosEndpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl FlowController for OnosFlowController {
    async fn install_flows(&self, rules: &[FlowRule]) -> Result<Vec<FlowHandle>> {
        let batch = FlowBatchDto { flows: rules.iter().map(FlowRuleDto::from).collect() };
        let url = self.url(&OnosEndpoint::Flows);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .json(&batch)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!("Flow installation rejected by controller. URL: <<{}>> Status: <<{}>> Body: <<{}>>", url, status, body_text);
            return Err(Error::controller(format!("installing {} rules failed with status {}: {}", rules.len(), status, body_text)));
        }

        let reply: FlowBatchResponseDto = response.json().await?;
        if reply.flows.len() != rules.len() {
            tracing::warn!("Controller confirmed {} of {} submitted rules.", reply.flows.len(), rules.len());
        }
        tracing::info!("Installed {} flow rules via {}", reply.flows.len(), url);

        Ok(reply.flows.into_iter().map(|flow| FlowHandle { device_id: DeviceId::new(flow.device_id), flow_id: FlowId::new(flow.flow_id) }).collect())
    }

    async fn remove_flow(&self, handle: &FlowHandle) -> Result<()> {
        let url = self.url(&OnosEndpoint::Flow(handle.clone()));

        let response = self.client.delete(&url).basic_auth(&self.user, Some(&self.password)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!("Flow removal rejected by controller. URL: <<{}>> Status: <<{}>> Body: <<{}>>", url, status, body_text);
            return Err(Error::controller(format!("removing flow {}/{} failed with status {}: {}", handle.device_id, handle.flow_id, status, body_text)));
        }

        tracing::debug!("Removed flow {}/{}", handle.device_id, handle.flow_id);
        Ok(())
    }
}
