//! Contract bindings for the bridge portal and the ERC-1155 minter.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};

use crate::blockchain::ledger::ContractCall;

/// L2 gas limit requested for the bridged deposit.
pub const DEPOSIT_L2_GAS_LIMIT: u64 = 100_000;

/// Items minted per call.
pub const MINT_QUANTITY: u64 = 1;

sol! {
    /// Optimism-style portal deposit from L1 to L2.
    function depositTransaction(
        address _to,
        uint256 _value,
        uint64 _gasLimit,
        bool _isCreation,
        bytes _data
    ) external payable;

    /// ERC-1155 mint through a sale strategy (minter) contract.
    function mint(
        address minter,
        uint256 tokenId,
        uint256 quantity,
        bytes minterArguments
    ) external payable;
}

/// Bridge `amount` from `account` on the source network to the same address on the destination.
pub fn bridge_deposit(bridge_contract: Address, account: Address, amount: U256) -> ContractCall {
    let input = depositTransactionCall {
        _to: account,
        _value: amount,
        _gasLimit: DEPOSIT_L2_GAS_LIMIT,
        _isCreation: false,
        _data: Bytes::new(),
    }
    .abi_encode();

    ContractCall {
        from: account,
        to: bridge_contract,
        value: amount,
        input: input.into(),
    }
}

/// Mint one `token_id` from `collection` to `account`, paying `price`.
///
/// The minter receives the recipient address ABI-encoded as its argument.
pub fn mint_item(
    collection: Address,
    minter: Address,
    token_id: U256,
    account: Address,
    price: U256,
) -> ContractCall {
    let input = mintCall {
        minter,
        tokenId: token_id,
        quantity: U256::from(MINT_QUANTITY),
        minterArguments: account.abi_encode().into(),
    }
    .abi_encode();

    ContractCall {
        from: account,
        to: collection,
        value: price,
        input: input.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_deposit_encoding() {
        let account = Address::repeat_byte(0xab);
        let portal = Address::repeat_byte(0x01);
        let call = bridge_deposit(portal, account, U256::from(1_000u64));

        assert_eq!(call.to, portal);
        assert_eq!(call.value, U256::from(1_000u64));
        assert_eq!(&call.input[..4], depositTransactionCall::SELECTOR.as_slice());

        let decoded = depositTransactionCall::abi_decode(&call.input).unwrap();
        assert_eq!(decoded._to, account);
        assert_eq!(decoded._gasLimit, DEPOSIT_L2_GAS_LIMIT);
        assert!(!decoded._isCreation);
        assert!(decoded._data.is_empty());
    }

    #[test]
    fn test_mint_arguments_are_padded_address() {
        let account = Address::repeat_byte(0xcd);
        let call = mint_item(
            Address::repeat_byte(0x02),
            Address::repeat_byte(0x03),
            U256::from(5u8),
            account,
            U256::from(777u64),
        );

        let decoded = mintCall::abi_decode(&call.input).unwrap();
        assert_eq!(decoded.tokenId, U256::from(5u8));
        assert_eq!(decoded.quantity, U256::from(1u8));

        let mut expected = vec![0u8; 12];
        expected.extend_from_slice(account.as_slice());
        assert_eq!(decoded.minterArguments.to_vec(), expected);
    }
}
