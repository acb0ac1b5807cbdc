// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract bindings used by the relayer.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface IWalletContract {
        function lastNonce() external view returns (uint256);
        function keyExist(address key) external view returns (bool);
    }
}

sol! {
    /// Entry point relayed signed messages are executed through.
    function executeSigned(
        address to,
        uint256 value,
        bytes data,
        uint256 nonce,
        uint256 gasPrice,
        address gasToken,
        uint256 gasLimitExecution,
        uint256 gasData,
        uint8 operationType,
        bytes signature
    ) external returns (bytes32);

    /// Wallet proxy initializer registering the ENS name.
    function initializeWithENS(
        address key,
        bytes32 hashLabel,
        string name,
        bytes32 node,
        address ens,
        address registrar,
        address resolver,
        uint256 gasPrice,
        address gasToken
    ) external;
}
