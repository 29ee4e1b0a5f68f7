use alloy::sol;
use serde::{Deserialize, Serialize};

sol! {
    #[derive(Serialize, Deserialize, Debug)]
    interface IErc20Lock {
        function lock(
            address token,
            uint256 amount,
            uint256 duration,
            string info,
            address unlockPrivilegeWallet
        ) external;
    }
}
