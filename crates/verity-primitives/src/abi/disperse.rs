use alloy::sol;
use serde::{Deserialize, Serialize};

// Disperse.app style batch sender
sol! {
    #[derive(Serialize, Deserialize, Debug)]
    interface IDisperse {
        function disperseEther(address[] recipients, uint256[] values) external payable;
        function disperseToken(address token, address[] recipients, uint256[] values) external;
    }
}
