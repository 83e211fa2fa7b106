use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::{ChainParams, EthereumChainConfig, ParamsError};
use crate::{
    constants::{EVM_PARAM_SUBSPACE, EVM_STORE_KEY, KEY_PREFIX_PARAMS, PARAMS_STORE_KEY},
    ContextError, KvStore, StateContext, StoreKey,
};

/// The parameter subspace the chain parameters were stored in before they moved under
/// [`KEY_PREFIX_PARAMS`].
///
/// Every field is a JSON value stored under `<subspace>/<FieldName>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyParamSubspace {
    name: &'static str,
    store_key: StoreKey,
}

impl Default for LegacyParamSubspace {
    fn default() -> Self {
        Self::new(EVM_PARAM_SUBSPACE, PARAMS_STORE_KEY)
    }
}

impl LegacyParamSubspace {
    /// Field name of the EVM denomination.
    pub const KEY_EVM_DENOM: &'static str = "EVMDenom";
    /// Field name of the contract creation switch.
    pub const KEY_ENABLE_CREATE: &'static str = "EnableCreate";
    /// Field name of the contract call switch.
    pub const KEY_ENABLE_CALL: &'static str = "EnableCall";
    /// Field name of the extra EIPs.
    pub const KEY_EXTRA_EIPS: &'static str = "EIPs";
    /// Field name of the fork schedule.
    pub const KEY_CHAIN_CONFIG: &'static str = "ChainConfig";
    /// Field name of the unprotected transactions switch.
    pub const KEY_ALLOW_UNPROTECTED_TXS: &'static str = "AllowUnprotectedTxs";

    /// Creates a subspace named `name` in the store mounted under `store_key`.
    pub const fn new(name: &'static str, store_key: StoreKey) -> Self {
        Self { name, store_key }
    }

    /// Get the subspace name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    fn key(&self, field: &str) -> String {
        format!("{}/{field}", self.name)
    }

    /// Reads the parameter set. Fields missing from the store keep their default value.
    pub fn param_set(&self, ctx: &StateContext) -> Result<ChainParams, ParamsError> {
        let store = mounted_store(ctx, self.store_key)?;
        let mut params = ChainParams::default();

        self.read_field(store, Self::KEY_EVM_DENOM, &mut params.evm_denom)?;
        self.read_field(store, Self::KEY_ENABLE_CREATE, &mut params.enable_create)?;
        self.read_field(store, Self::KEY_ENABLE_CALL, &mut params.enable_call)?;
        self.read_field(store, Self::KEY_EXTRA_EIPS, &mut params.extra_eips)?;
        self.read_field(store, Self::KEY_CHAIN_CONFIG, &mut params.chain_config)?;
        self.read_field(
            store,
            Self::KEY_ALLOW_UNPROTECTED_TXS,
            &mut params.allow_unprotected_txs,
        )?;
        Ok(params)
    }

    /// Writes every field of `params`.
    pub fn set_param_set(
        &self,
        ctx: &StateContext,
        params: &ChainParams,
    ) -> Result<(), ParamsError> {
        let store = mounted_store(ctx, self.store_key)?;

        self.write_field(store, Self::KEY_EVM_DENOM, &params.evm_denom)?;
        self.write_field(store, Self::KEY_ENABLE_CREATE, &params.enable_create)?;
        self.write_field(store, Self::KEY_ENABLE_CALL, &params.enable_call)?;
        self.write_field(store, Self::KEY_EXTRA_EIPS, &params.extra_eips)?;
        self.write_field(store, Self::KEY_CHAIN_CONFIG, &params.chain_config)?;
        self.write_field(store, Self::KEY_ALLOW_UNPROTECTED_TXS, &params.allow_unprotected_txs)
    }

    fn read_field<T: DeserializeOwned>(
        &self,
        store: &dyn KvStore,
        field: &str,
        value: &mut T,
    ) -> Result<(), ParamsError> {
        let key = self.key(field);
        if let Some(bytes) = store.get(key.as_bytes()) {
            *value = serde_json::from_slice(&bytes)
                .map_err(|source| ParamsError::Decode { key, source })?;
        }
        Ok(())
    }

    fn write_field<T: Serialize>(
        &self,
        store: &dyn KvStore,
        field: &str,
        value: &T,
    ) -> Result<(), ParamsError> {
        let bytes = serde_json::to_vec(value).map_err(ParamsError::Encode)?;
        store.set(self.key(field).as_bytes(), bytes);
        Ok(())
    }
}

/// Reads and writes the chain parameters.
#[derive(Clone, Copy, Debug)]
pub struct ParamsKeeper {
    store_key: StoreKey,
    legacy: LegacyParamSubspace,
}

impl Default for ParamsKeeper {
    fn default() -> Self {
        Self::new(EVM_STORE_KEY, LegacyParamSubspace::default())
    }
}

impl ParamsKeeper {
    /// Creates a keeper storing the parameters in the store mounted under `store_key`, falling
    /// back to `legacy` when they have not been written there yet.
    pub const fn new(store_key: StoreKey, legacy: LegacyParamSubspace) -> Self {
        Self { store_key, legacy }
    }

    /// Get the legacy parameter subspace.
    pub const fn legacy(&self) -> &LegacyParamSubspace {
        &self.legacy
    }

    /// Returns the chain parameters, read from the legacy subspace if they have never been
    /// written under [`KEY_PREFIX_PARAMS`].
    pub fn params(&self, ctx: &StateContext) -> Result<ChainParams, ParamsError> {
        match self.primary_blob(ctx)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| ParamsError::Decode {
                key: format!("{}/{KEY_PREFIX_PARAMS:02x?}", self.store_key),
                source,
            }),
            None => {
                let subspace = self.legacy.name();
                debug!(target: "aspect::params", subspace, "Reading legacy params");
                self.legacy.param_set(ctx)
            }
        }
    }

    /// Returns the blob stored under [`KEY_PREFIX_PARAMS`]. An empty value counts as absent.
    fn primary_blob(&self, ctx: &StateContext) -> Result<Option<Vec<u8>>, ContextError> {
        let store = mounted_store(ctx, self.store_key)?;
        Ok(store.get(KEY_PREFIX_PARAMS).filter(|bytes| !bytes.is_empty()))
    }

    /// Validates and stores the chain parameters.
    pub fn set_params(&self, ctx: &StateContext, params: &ChainParams) -> Result<(), ParamsError> {
        params.validate()?;

        let store = mounted_store(ctx, self.store_key)?;
        let bytes = serde_json::to_vec(params).map_err(ParamsError::Encode)?;
        info!(target: "aspect::params", ?params, "Setting chain params");
        store.set(KEY_PREFIX_PARAMS, bytes);
        Ok(())
    }

    /// Returns the fork schedule bound to the chain id of `ctx`.
    pub fn chain_config(&self, ctx: &StateContext) -> Result<EthereumChainConfig, ParamsError> {
        Ok(self.params(ctx)?.chain_config.ethereum_config(ctx.chain_id()))
    }

    /// Moves the legacy parameters under [`KEY_PREFIX_PARAMS`]. Returns `false` if they are
    /// already stored there. An empty value under the key is overwritten, as [`Self::params`]
    /// ignores it.
    pub fn migrate_legacy(&self, ctx: &StateContext) -> Result<bool, ParamsError> {
        if self.primary_blob(ctx)?.is_some() {
            return Ok(false);
        }

        let params = self.legacy.param_set(ctx)?;
        self.set_params(ctx, &params)?;
        info!(target: "aspect::params", subspace = self.legacy.name(), "Migrated legacy params");
        Ok(true)
    }
}

fn mounted_store(ctx: &StateContext, key: StoreKey) -> Result<&dyn KvStore, ContextError> {
    ctx.kv_store(&key).ok_or(ContextError::StoreNotMounted(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::ChainConfig, test_utils::state_context};

    #[test]
    fn test_params_default_without_any_store_entry() {
        let ctx = state_context(1, 1);
        assert_eq!(ParamsKeeper::default().params(&ctx).unwrap(), ChainParams::default());
    }

    #[test]
    fn test_set_then_get() {
        let ctx = state_context(1, 1);
        let keeper = ParamsKeeper::default();
        let params =
            ChainParams::default().with_extra_eips(vec![3855]).with_allow_unprotected_txs(true);

        keeper.set_params(&ctx, &params).unwrap();
        assert_eq!(keeper.params(&ctx).unwrap(), params);
    }

    #[test]
    fn test_set_rejects_invalid_params_without_writing() {
        let ctx = state_context(1, 1);
        let keeper = ParamsKeeper::default();
        let params = ChainParams::default().with_extra_eips(vec![42]);

        assert!(matches!(
            keeper.set_params(&ctx, &params),
            Err(ParamsError::EipNotActivateable(42))
        ));
        assert!(!ctx.kv_store(&EVM_STORE_KEY).unwrap().has(KEY_PREFIX_PARAMS));
    }

    #[test]
    fn test_legacy_fallback_and_migration() {
        let ctx = state_context(1, 1);
        let keeper = ParamsKeeper::default();
        let legacy = ChainParams {
            evm_denom: "uart".to_string(),
            enable_create: false,
            ..Default::default()
        };
        keeper.legacy().set_param_set(&ctx, &legacy).unwrap();

        assert_eq!(keeper.params(&ctx).unwrap(), legacy);
        assert!(keeper.migrate_legacy(&ctx).unwrap());
        assert!(!keeper.migrate_legacy(&ctx).unwrap());

        // The primary key now shadows the legacy subspace.
        keeper.legacy().set_param_set(&ctx, &ChainParams::default()).unwrap();
        assert_eq!(keeper.params(&ctx).unwrap(), legacy);
    }

    #[test]
    fn test_empty_primary_blob_is_migrated() {
        let ctx = state_context(1, 1);
        let keeper = ParamsKeeper::default();
        let legacy = ChainParams { evm_denom: "uart".to_string(), ..Default::default() };
        keeper.legacy().set_param_set(&ctx, &legacy).unwrap();
        ctx.kv_store(&EVM_STORE_KEY).unwrap().set(KEY_PREFIX_PARAMS, Vec::new());

        assert_eq!(keeper.params(&ctx).unwrap(), legacy);
        assert!(keeper.migrate_legacy(&ctx).unwrap());

        let stored = ctx.kv_store(&EVM_STORE_KEY).unwrap().get(KEY_PREFIX_PARAMS).unwrap();
        assert_eq!(serde_json::from_slice::<ChainParams>(&stored).unwrap(), legacy);
        assert!(!keeper.migrate_legacy(&ctx).unwrap());
    }

    #[test]
    fn test_legacy_missing_fields_keep_defaults() {
        let ctx = state_context(1, 1);
        let store = ctx.kv_store(&PARAMS_STORE_KEY).unwrap();
        store.set(b"evm/EVMDenom", br#""uart""#.to_vec());

        let params = ParamsKeeper::default().params(&ctx).unwrap();
        assert_eq!(params.evm_denom, "uart");
        assert_eq!(params.chain_config, ChainConfig::default());
        assert!(params.enable_call);
    }

    #[test]
    fn test_corrupted_params() {
        let ctx = state_context(1, 1);
        ctx.kv_store(&EVM_STORE_KEY).unwrap().set(KEY_PREFIX_PARAMS, b"{".to_vec());
        assert!(matches!(ParamsKeeper::default().params(&ctx), Err(ParamsError::Decode { .. })));

        let ctx = state_context(1, 1);
        ctx.kv_store(&PARAMS_STORE_KEY).unwrap().set(b"evm/EIPs", b"3855".to_vec());
        assert!(matches!(
            ParamsKeeper::default().params(&ctx),
            Err(ParamsError::Decode { key, .. }) if key == "evm/EIPs"
        ));
    }

    #[test]
    fn test_chain_config_bound_to_context_chain() {
        let ctx = state_context(1, 11820);
        let config = ParamsKeeper::default().chain_config(&ctx).unwrap();
        assert_eq!(config.chain_id, 11820);
        assert_eq!(config.config, ChainConfig::default());
    }

    #[test]
    fn test_store_not_mounted() {
        let ctx = StateContext::new(1, Default::default());
        assert!(matches!(
            ParamsKeeper::default().params(&ctx),
            Err(ParamsError::Context(ContextError::StoreNotMounted(_)))
        ));
    }
}
