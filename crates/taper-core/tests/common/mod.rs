#![allow(dead_code)]

use taper_amm::{AccountId, Host, PoolKey, TokenId};
use taper_core::{BootstrapConfig, Bootstrapper};

pub const ENGINE: AccountId = AccountId(100);
pub const OWNER: AccountId = AccountId(5);
pub const TRADER: AccountId = AccountId(6);
pub const LP: AccountId = AccountId(7);

pub const BOOT: TokenId = TokenId(1);
pub const QUOTE: TokenId = TokenId(2);

/// floor(sqrt(2) * 2^64), i.e. price 2: tick 6931.
pub const SQRT_2_1_X64: u128 = 26_087_635_650_665_564_424;
/// floor(sqrt(1/2) * 2^64), i.e. price 1/2: tick -6932.
pub const SQRT_1_2_X64: u128 = 13_043_817_825_332_782_212;

pub const TOTAL: u128 = 1_000 * 10u128.pow(18);
pub const EPOCH: u64 = 3_600;

pub fn setup(init_sqrt_price: u128) -> (Host, Bootstrapper, PoolKey) {
    let mut host = Host::new();
    let key = PoolKey::new(BOOT, QUOTE, 1);
    host.create_pool(key, init_sqrt_price).unwrap();
    (host, Bootstrapper::new(ENGINE), key)
}

/// Funds the owner and registers the bootstrap at `now`.
pub fn init(
    host: &mut Host,
    engine: &mut Bootstrapper,
    key: PoolKey,
    config: BootstrapConfig,
    now: u64,
) {
    host.set_now(now);
    host.mint(key.token(config.is_token0), OWNER, config.total_amount);
    engine
        .after_initialize(host, OWNER, key, config, EPOCH)
        .unwrap();
}

/// The day-long token0 schedule used by the placement scenarios.
pub fn day_config(min_tick: i32, max_tick: i32) -> BootstrapConfig {
    BootstrapConfig {
        total_amount: TOTAL,
        start_time: 10_000,
        end_time: 10_000 + 86_400,
        min_tick,
        max_tick,
        is_token0: true,
    }
}
