use serde::Deserialize;

use super::{decode_link, lenient_link, lenient_list, Field, LinkDescriptor};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeEnvRecord {
    pub name: Field,
    pub description: Field,
    pub resource_count: Field,
    pub created: Field,
    pub providers: Field,
    #[serde(deserialize_with = "lenient_link")]
    pub viewruntimeenvlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub ownerlink: Option<LinkDescriptor>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveRecord {
    pub id: Field,
    pub name: Field,
    pub created: Field,
    /// Number of files in the archive.
    pub frozenfiles: Field,
    #[serde(deserialize_with = "lenient_link")]
    pub viewfreezelink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub delfreezelink: Option<LinkDescriptor>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrozenFile {
    pub name: Field,
    pub size: Field,
    pub md5sum: Field,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveDetail {
    pub id: Field,
    pub name: Field,
    pub description: Field,
    pub publish: Field,
    pub publish_url: Field,
    pub creator: Field,
    pub created: Field,
    /// `[site, value]` pairs.
    pub location: Option<Vec<Vec<Field>>>,
    #[serde(deserialize_with = "lenient_list")]
    pub frozenfiles: Vec<FrozenFile>,
}

impl ArchiveDetail {
    pub fn locations(&self) -> impl Iterator<Item = (Field, Field)> + '_ {
        self.location.iter().flatten().map(|pair| {
            (
                pair.first().cloned().unwrap_or_default(),
                pair.get(1).cloned().unwrap_or_default(),
            )
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct VgridRecord {
    pub name: Field,
    #[serde(deserialize_with = "lenient_link")]
    pub viewvgridlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub administratelink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub memberlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub sharedfolderlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub enterprivatelink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub editprivatelink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub enterpubliclink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub editpubliclink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub ownerscmlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub memberscmlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub ownertrackerlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub membertrackerlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub privateforumlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub publicforumlink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub privateworkflowslink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub privatemonitorlink: Option<LinkDescriptor>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResourceRecord {
    pub name: Field,
    #[serde(deserialize_with = "lenient_link")]
    pub resdetailslink: Option<LinkDescriptor>,
    #[serde(deserialize_with = "lenient_link")]
    pub resownerlink: Option<LinkDescriptor>,
    #[serde(rename = "SANDBOX")]
    pub sandbox: Field,
    #[serde(rename = "RUNTIMEENVIRONMENT")]
    pub runtime_environments: Field,
    #[serde(rename = "PUBLICNAME")]
    pub public_name: Field,
    #[serde(rename = "NODECOUNT")]
    pub node_count: Field,
    #[serde(rename = "CPUCOUNT")]
    pub cpu_count: Field,
    #[serde(rename = "MEMORY")]
    pub memory: Field,
    #[serde(rename = "DISK")]
    pub disk: Field,
    #[serde(rename = "ARCHITECTURE")]
    pub architecture: Field,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    pub name: Field,
    #[serde(deserialize_with = "lenient_link")]
    pub userdetailslink: Option<LinkDescriptor>,
    /// Remaining fields, including the per-protocol `send<proto>link` entries.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// The send link for `protocol`, if the backend offered one.
    pub fn send_link(&self, protocol: &str) -> Option<LinkDescriptor> {
        let key = format!("send{protocol}link");
        decode_link(self.extra.get(&key)?.clone())
    }
}
