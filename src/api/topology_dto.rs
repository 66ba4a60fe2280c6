use serde::{Deserialize, Deserializer};

/// Static description of the network as produced by the topology generator
/// and completed by the port discovery step.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDto {
    /// Node names. The position in this list defines the switch number (1-based).
    #[serde(alias = "cities")]
    pub nodes: Vec<String>,
    pub links: Vec<LinkDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkDto {
    #[serde(alias = "city_a")]
    pub node_a: String,
    #[serde(alias = "city_b")]
    pub node_b: String,

    /// Propagation delay in milliseconds.
    pub delay: f64,

    /// Maximum bandwidth in Mb/s.
    pub bandwidth: f64,

    #[serde(deserialize_with = "deserialize_port")]
    pub port_a: u32,
    #[serde(deserialize_with = "deserialize_port")]
    pub port_b: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u32),
    Text(String),
}

/// The controller reports ports as strings, hand-written files usually use numbers.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => text.trim().parse::<u32>().map_err(|_| serde::de::Error::custom(format!("invalid port number '{}'", text))),
    }
}
