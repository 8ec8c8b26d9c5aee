//! JSON-RPC `eth_call` implementation of the state reader.

use super::abi::{
    IAuctionHouse, IAuctionModule, IERC20Metadata, IEncryptedMarginalPrice, IFixedPriceBatch,
    ILinearVesting,
};
use super::{
    BidClaim, ContractStateReader, EmpAuctionData, FpbAuctionData, LotData, LotFees, LotRouting,
    ModuleBid, PartialFill, ReaderError, TokenMetadata,
};
use crate::domain::{BlockRef, Keycode, ModuleKind, Veecode};
use alloy_primitives::aliases::U96;
use alloy_primitives::{hex, Address, Bytes, FixedBytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Reads contract state through `eth_call` pinned to a block number.
#[derive(Debug)]
pub struct RpcStateReader {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl RpcStateReader {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
            next_id: AtomicU64::new(1),
        }
    }

    async fn post_rpc(&self, payload: serde_json::Value) -> Result<serde_json::Value, ReaderError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&self.rpc_url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(ReaderError::NetworkError(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(ReaderError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(ReaderError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(ReaderError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(ReaderError::DecodeError(e.to_string())))
        })
        .await
    }

    async fn eth_call<C>(&self, at: BlockRef, to: Address, call: &C) -> Result<C::Return, ReaderError>
    where
        C: SolCall + Sync,
    {
        debug!(to = %to, block = at.number(), call = C::SIGNATURE, "eth_call");

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": "eth_call",
            "params": [
                { "to": format!("{to:#x}"), "data": hex::encode_prefixed(call.abi_encode()) },
                block_tag(at),
            ]
        });

        let response = self.post_rpc(payload).await?;
        if let Some(error) = response.get("error") {
            return Err(ReaderError::RpcError {
                code: error.get("code").and_then(|v| v.as_i64()).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        let result = response
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ReaderError::DecodeError("missing result".to_string()))?;
        let data = hex::decode(result).map_err(|e| ReaderError::DecodeError(e.to_string()))?;

        C::abi_decode_returns(&data)
            .map_err(|e| ReaderError::DecodeError(format!("{}: {}", C::SIGNATURE, e)))
    }
}

fn block_tag(at: BlockRef) -> String {
    format!("0x{:x}", at.number())
}

fn keycode_bytes(keycode: &Keycode) -> FixedBytes<5> {
    let mut bytes = [0u8; 5];
    for (slot, byte) in bytes.iter_mut().zip(keycode.as_str().bytes()) {
        *slot = byte;
    }
    FixedBytes(bytes)
}

#[async_trait]
impl ContractStateReader for RpcStateReader {
    async fn lot_data(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<LotData, ReaderError> {
        let call = IAuctionHouse::lotDataCall {
            lotId: U96::from(lot_id),
        };
        let data = self.eth_call(at, auction_house, &call).await?;
        Ok(LotData {
            start: data.start.to::<u64>(),
            conclusion: data.conclusion.to::<u64>(),
            quote_token_decimals: data.quoteTokenDecimals,
            base_token_decimals: data.baseTokenDecimals,
            capacity_in_quote: data.capacityInQuote,
            capacity: data.capacity,
            sold: data.sold,
            purchased: data.purchased,
        })
    }

    async fn lot_routing(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<LotRouting, ReaderError> {
        let call = IAuctionHouse::lotRoutingCall {
            lotId: U96::from(lot_id),
        };
        let routing = self.eth_call(at, auction_house, &call).await?;
        Ok(LotRouting {
            seller: routing.seller,
            base_token: routing.baseToken,
            quote_token: routing.quoteToken,
            auction_reference: Veecode(routing.auctionReference),
            derivative_reference: Veecode(routing.derivativeReference),
            wrap_derivative: routing.wrapDerivative,
            derivative_params: routing.derivativeParams,
        })
    }

    async fn lot_fees(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<LotFees, ReaderError> {
        let call = IAuctionHouse::lotFeesCall {
            lotId: U96::from(lot_id),
        };
        let fees = self.eth_call(at, auction_house, &call).await?;
        Ok(LotFees {
            curator: fees.curator,
            curated: fees.curated,
            curator_fee: fees.curatorFee.to::<u64>(),
            protocol_fee: fees.protocolFee.to::<u64>(),
            referrer_fee: fees.referrerFee.to::<u64>(),
        })
    }

    async fn module_for_keycode(
        &self,
        at: BlockRef,
        auction_house: Address,
        keycode: &Keycode,
    ) -> Result<Address, ReaderError> {
        let call = IAuctionHouse::getModuleForKeycodeCall {
            keycode: keycode_bytes(keycode),
        };
        self.eth_call(at, auction_house, &call).await
    }

    async fn module_for_lot_id(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<Address, ReaderError> {
        let call = IAuctionHouse::getModuleForIdCall {
            lotId: U96::from(lot_id),
        };
        self.eth_call(at, auction_house, &call).await
    }

    async fn module_parent(&self, at: BlockRef, module: Address) -> Result<Address, ReaderError> {
        self.eth_call(at, module, &IAuctionModule::PARENTCall {}).await
    }

    async fn emp_auction_data(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
    ) -> Result<EmpAuctionData, ReaderError> {
        let call = IEncryptedMarginalPrice::auctionDataCall {
            lotId: U96::from(lot_id),
        };
        let data = self.eth_call(at, module, &call).await?;
        Ok(EmpAuctionData {
            status: data.status,
            marginal_price: data.marginalPrice,
            min_price: data.minPrice,
            min_filled: data.minFilled,
            min_bid_size: data.minBidSize,
        })
    }

    async fn fpb_auction_data(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
    ) -> Result<FpbAuctionData, ReaderError> {
        let call = IFixedPriceBatch::auctionDataCall {
            lotId: U96::from(lot_id),
        };
        let data = self.eth_call(at, module, &call).await?;
        Ok(FpbAuctionData {
            status: data.status,
            price: data.price,
            min_filled: data.minFilled,
        })
    }

    async fn bid(
        &self,
        at: BlockRef,
        module: Address,
        kind: ModuleKind,
        lot_id: u64,
        bid_id: u64,
    ) -> Result<ModuleBid, ReaderError> {
        match kind {
            ModuleKind::EncryptedMarginalPrice => {
                let call = IEncryptedMarginalPrice::bidsCall {
                    lotId: U96::from(lot_id),
                    bidId: bid_id,
                };
                let bid = self.eth_call(at, module, &call).await?;
                Ok(ModuleBid {
                    bidder: bid.bidder,
                    amount: U256::from(bid.amount),
                    referrer: bid.referrer,
                    status: bid.status,
                })
            }
            ModuleKind::FixedPriceBatch => {
                let call = IFixedPriceBatch::bidsCall {
                    lotId: U96::from(lot_id),
                    bidId: bid_id,
                };
                let bid = self.eth_call(at, module, &call).await?;
                Ok(ModuleBid {
                    bidder: bid.bidder,
                    amount: U256::from(bid.amount),
                    referrer: bid.referrer,
                    status: bid.status,
                })
            }
        }
    }

    async fn bid_claim(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
        bid_id: u64,
    ) -> Result<BidClaim, ReaderError> {
        let call = IAuctionModule::getBidClaimCall {
            lotId: U96::from(lot_id),
            bidId: bid_id,
        };
        let claim = self.eth_call(at, module, &call).await?;
        Ok(BidClaim {
            bidder: claim.bidder,
            referrer: claim.referrer,
            paid: claim.paid,
            payout: claim.payout,
            refund: claim.refund,
        })
    }

    async fn partial_fill(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
    ) -> Result<PartialFill, ReaderError> {
        let call = IAuctionModule::getPartialFillCall {
            lotId: U96::from(lot_id),
        };
        let fill = self.eth_call(at, module, &call).await?;
        Ok(PartialFill {
            has_partial_fill: fill.hasPartialFill,
            bid_id: fill.partialFill.bidId,
            refund: U256::from(fill.partialFill.refund),
            payout: fill.partialFill.payout,
        })
    }

    async fn token_metadata(
        &self,
        at: BlockRef,
        token: Address,
    ) -> Result<TokenMetadata, ReaderError> {
        let (name, symbol, decimals, total_supply) = futures::try_join!(
            self.eth_call(at, token, &IERC20Metadata::nameCall {}),
            self.eth_call(at, token, &IERC20Metadata::symbolCall {}),
            self.eth_call(at, token, &IERC20Metadata::decimalsCall {}),
            self.eth_call(at, token, &IERC20Metadata::totalSupplyCall {}),
        )?;
        Ok(TokenMetadata {
            name,
            symbol,
            decimals,
            total_supply,
        })
    }

    async fn derivative_token_id(
        &self,
        at: BlockRef,
        module: Address,
        underlying: Address,
        params: &Bytes,
    ) -> Result<U256, ReaderError> {
        let call = ILinearVesting::computeIdCall {
            underlyingToken: underlying,
            params: params.clone(),
        };
        self.eth_call(at, module, &call).await
    }

    async fn derivative_balance_of(
        &self,
        at: BlockRef,
        module: Address,
        holder: Address,
        token_id: U256,
    ) -> Result<U256, ReaderError> {
        let call = ILinearVesting::balanceOfCall {
            owner: holder,
            tokenId: token_id,
        };
        self.eth_call(at, module, &call).await
    }
}
