use serde::{Deserialize, Serialize};

/// Body of `POST /onos/v1/flows`.
#[derive(Debug, Clone, Serialize)]
pub struct FlowBatchDto {
    pub flows: Vec<FlowRuleDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRuleDto {
    pub priority: u32,
    pub timeout: u32,
    pub is_permanent: bool,
    pub device_id: String,
    pub treatment: TreatmentDto,
    pub selector: SelectorDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreatmentDto {
    pub instructions: Vec<InstructionDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum InstructionDto {
    #[serde(rename = "OUTPUT")]
    Output { port: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectorDto {
    pub criteria: Vec<CriterionDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CriterionDto {
    #[serde(rename = "IN_PORT")]
    InPort { port: String },
    #[serde(rename = "ETH_TYPE")]
    EthType {
        #[serde(rename = "ethType")]
        eth_type: String,
    },
    #[serde(rename = "IPV4_SRC")]
    Ipv4Src { ip: String },
    #[serde(rename = "IPV4_DST")]
    Ipv4Dst { ip: String },
    #[serde(rename = "IP_PROTO")]
    IpProto { protocol: String },
}

/// Reply of `POST /onos/v1/flows`: one entry per submitted rule.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowBatchResponseDto {
    #[serde(default)]
    pub flows: Vec<FlowHandleDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowHandleDto {
    pub device_id: String,
    pub flow_id: String,
}
