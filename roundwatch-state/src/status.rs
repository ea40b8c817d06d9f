use roundwatch_rpc::StatusResult;

/// Identity and sync position of the node being watched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeStatus {
    pub node_id: String,
    pub moniker: String,
    pub network: String,
    pub version: String,
    pub validator_address: String,
    /// None when the node reports a height we can't parse
    pub latest_block_height: Option<i64>,
    pub catching_up: bool,
}

impl From<StatusResult> for NodeStatus {
    fn from(status: StatusResult) -> Self {
        Self {
            latest_block_height: status.sync_info.latest_block_height.parse().ok(),
            catching_up: status.sync_info.catching_up,
            node_id: status.node_info.id,
            moniker: status.node_info.moniker,
            network: status.node_info.network,
            version: status.node_info.version,
            validator_address: status.validator_info.address,
        }
    }
}
