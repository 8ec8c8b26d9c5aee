//! Read-through cache of token metadata.

use super::batch::ProjectionBatch;
use super::error::ProjectionError;
use crate::db::Repository;
use crate::domain::{to_decimal, BlockRef, Token};
use crate::reader::ContractStateReader;
use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Token records are immutable once resolved: memory first, then the store,
/// then one authoritative read.
///
/// Tokens resolved from a read are staged in the event's batch and admitted
/// to memory only after the batch commits, so a failed event never leaves a
/// cached token the store does not have.
#[derive(Debug)]
pub struct TokenCache {
    chain: String,
    reader: Arc<dyn ContractStateReader>,
    repo: Repository,
    tokens: RwLock<HashMap<Address, Token>>,
}

impl TokenCache {
    pub fn new(chain: String, reader: Arc<dyn ContractStateReader>, repo: Repository) -> Self {
        Self {
            chain,
            reader,
            repo,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    fn cached(&self, address: &Address) -> Option<Token> {
        self.tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.get(address).cloned())
    }

    /// Resolve a token, staging it in `batch` when it had to be read.
    pub async fn resolve(
        &self,
        at: BlockRef,
        address: Address,
        batch: &mut ProjectionBatch,
    ) -> Result<Token, ProjectionError> {
        if let Some(token) = self.cached(&address) {
            return Ok(token);
        }

        let id = Token::key(&self.chain, &address);
        if let Some(staged) = batch.tokens.iter().find(|t| t.id == id) {
            return Ok(staged.clone());
        }

        if let Some(token) = self.repo.get_token(&id).await? {
            self.admit(std::slice::from_ref(&token));
            return Ok(token);
        }

        let metadata = self.reader.token_metadata(at, address).await?;
        debug!(token = %id, symbol = %metadata.symbol, "Resolved token metadata");
        let token = Token {
            id,
            chain: self.chain.clone(),
            address,
            name: metadata.name,
            symbol: metadata.symbol,
            decimals: metadata.decimals,
            total_supply: to_decimal(metadata.total_supply, metadata.decimals),
        };
        batch.put_token(token.clone());
        Ok(token)
    }

    /// Make committed tokens visible to later lookups.
    pub fn admit(&self, tokens: &[Token]) {
        if tokens.is_empty() {
            return;
        }
        if let Ok(mut cache) = self.tokens.write() {
            for token in tokens {
                cache.entry(token.address).or_insert_with(|| token.clone());
            }
        }
    }
}
