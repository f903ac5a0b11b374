//! Contract ABI bindings
//!
//! ERC-20 token ledger and the stable controller's swap surface.

use alloy_primitives::hex;
use alloy_sol_types::{sol, Revert, SolError};

sol! {
    #[derive(Debug)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);

        error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);
        error ERC20InsufficientAllowance(address spender, uint256 allowance, uint256 needed);
    }

    #[derive(Debug)]
    interface IStableController {
        function swapFeeBps() external view returns (uint256);
        function previewSwapRedeemLike(uint256 amountIn)
            external
            view
            returns (uint256 netOut, uint256 fee, uint256 grossOut);
        function swapMintLike(uint256 amountIn) external returns (uint256 out);
        function swapRedeemLike(uint256 amountIn) external returns (uint256 out);
    }
}

/// Selector of OpenZeppelin's `ERC20InsufficientBalance` custom error
pub const INSUFFICIENT_BALANCE_SELECTOR: [u8; 4] = IERC20::ERC20InsufficientBalance::SELECTOR;

/// Selector of OpenZeppelin's `ERC20InsufficientAllowance` custom error
pub const INSUFFICIENT_ALLOWANCE_SELECTOR: [u8; 4] = IERC20::ERC20InsufficientAllowance::SELECTOR;

/// Decode hex revert data (with or without `0x`)
pub fn decode_revert_data(data: &str) -> Option<Vec<u8>> {
    hex::decode(data.trim()).ok()
}

/// First four bytes of revert data
pub fn revert_selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4).and_then(|s| s.try_into().ok())
}

/// Reason string of a standard `Error(string)` revert
pub fn revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data).ok().map(|r| r.reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use alloy_sol_types::SolCall;

    #[test]
    fn test_erc20_selectors() {
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(IERC20::allowanceCall::SELECTOR, [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(IERC20::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_encode_balance_of() {
        let call = IERC20::balanceOfCall {
            account: Address::ZERO,
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &IERC20::balanceOfCall::SELECTOR);
    }

    #[test]
    fn test_decode_preview_returns() {
        let mut data = Vec::new();
        for v in [9_975u64, 25, 10_000] {
            data.extend_from_slice(&U256::from(v).to_be_bytes::<32>());
        }
        let ret = IStableController::previewSwapRedeemLikeCall::abi_decode_returns(&data).unwrap();
        assert_eq!(ret.netOut, U256::from(9_975u64));
        assert_eq!(ret.fee, U256::from(25u64));
        assert_eq!(ret.grossOut, U256::from(10_000u64));
    }

    #[test]
    fn test_revert_reason() {
        let data = Revert::from("ERC20: insufficient allowance").abi_encode();
        assert_eq!(
            revert_reason(&data).as_deref(),
            Some("ERC20: insufficient allowance")
        );
        assert_eq!(revert_selector(&data), Some(Revert::SELECTOR));
    }

    #[test]
    fn test_revert_selector_too_short() {
        assert_eq!(revert_selector(&[0x01, 0x02]), None);
        assert_eq!(decode_revert_data("0xfb8f41b2").unwrap().len(), 4);
    }
}
