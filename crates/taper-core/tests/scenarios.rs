//! End-to-end scenarios for the epoch sync engine against the venue model.

mod common;

use common::*;

use taper_amm::{AmmError, PoolKey, SwapParams, TokenId};
use taper_core::{BootstrapConfig, EngineError};
use taper_math::tick_math::get_sqrt_price_at_tick;

#[test]
fn out_of_range_placement_widens_each_epoch() {
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    init(&mut host, &mut engine, key, day_config(10_000, 20_000), 9_000);

    // before the window the sync is inert
    host.set_now(9_999);
    engine.sync(&mut host, &key).unwrap();
    let state = engine.pool(&key).unwrap();
    assert_eq!(state.amount_committed, 0);
    assert!(state.synced_epochs.is_empty());
    assert_eq!(host.position(&key, ENGINE, 15_741, 20_000).unwrap(), 0);

    // mid-window: epoch floor 46800, floor tick 15741, tranche placed above
    // the market as a pure bootstrapping-token position
    host.set_now(50_000);
    engine.sync(&mut host, &key).unwrap();
    assert_eq!(
        host.position(&key, ENGINE, 15_741, 20_000).unwrap(),
        4_878_558_521_669_597_614_340
    );
    let state = engine.pool(&key).unwrap();
    assert_eq!(state.amount_committed, 425_925_925_925_925_925_925);
    assert_eq!(state.floor_tick, 15_741);
    // the market never moved
    assert_eq!(host.slot0(&key).unwrap().tick, 6_931);

    // a second sync in the same epoch is a no-op
    engine.sync(&mut host, &key).unwrap();
    assert_eq!(
        host.position(&key, ENGINE, 15_741, 20_000).unwrap(),
        4_878_558_521_669_597_614_340
    );
    assert_eq!(
        engine.pool(&key).unwrap().amount_committed,
        425_925_925_925_925_925_925
    );

    // past the window the full amount sits at the widest range
    host.set_now(10_000 + 86_400 + 3_600);
    engine.sync(&mut host, &key).unwrap();
    assert_eq!(host.position(&key, ENGINE, 15_741, 20_000).unwrap(), 0);
    assert_eq!(
        host.position(&key, ENGINE, 10_000, 20_000).unwrap(),
        4_190_272_079_389_499_703_865
    );
    let state = engine.pool(&key).unwrap();
    assert_eq!(state.amount_committed, TOTAL);
    assert_eq!(state.floor_tick, 10_000);
}

#[test]
fn in_range_forced_sell_pushes_the_price_out() {
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    init(&mut host, &mut engine, key, day_config(0, 5_000), 9_000);

    // the market starts at tick 6931, inside the schedule's range: the sync
    // sells down to one tick under the floor before provisioning
    host.set_now(50_000);
    engine.sync(&mut host, &key).unwrap();
    assert_eq!(host.slot0(&key).unwrap().tick, 2_870);
    assert_eq!(
        host.position(&key, ENGINE, 2_871, 5_000).unwrap(),
        4_869_217_071_209_495_209_276
    );
    assert_eq!(
        engine.pool(&key).unwrap().amount_committed,
        425_925_925_925_925_925_925
    );

    // next epoch: the floor has decayed further and the sell repeats
    host.set_now(60_000);
    engine.sync(&mut host, &key).unwrap();
    assert_eq!(host.slot0(&key).unwrap().tick, 2_245);
    assert_eq!(host.position(&key, ENGINE, 2_871, 5_000).unwrap(), 0);
    assert_eq!(
        host.position(&key, ENGINE, 2_246, 5_000).unwrap(),
        4_791_885_898_590_874_703_887
    );
    assert_eq!(
        engine.pool(&key).unwrap().amount_committed,
        550_925_925_925_925_925_925
    );
}

#[test]
fn exit_returns_the_committed_tokens_to_the_owner() {
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    init(&mut host, &mut engine, key, day_config(0, 5_000), 9_000);
    assert_eq!(host.balance_of(BOOT, OWNER), 0);

    host.set_now(50_000);
    engine.sync(&mut host, &key).unwrap();

    host.set_now(10_000 + 86_400 + 3_600);
    engine.exit(&mut host, &key, OWNER).unwrap();

    // the full committed amount comes back, minus fixed-point dust
    let returned = host.balance_of(BOOT, OWNER);
    assert!(returned <= TOTAL);
    assert!(TOTAL - returned <= 10, "lost {} base units", TOTAL - returned);
    assert_eq!(host.balance_of(QUOTE, OWNER), 0);

    // the engine is latched shut
    let state = engine.pool(&key).unwrap();
    assert!(state.exited);
    host.set_now(10_000 + 86_400 + 2 * 3_600);
    engine.sync(&mut host, &key).unwrap();
    assert_eq!(host.balance_of(BOOT, OWNER), returned);
    assert_eq!(host.position(&key, ENGINE, 0, 5_000).unwrap(), 0);
}

#[test]
fn narrow_range_schedules_conserve_principal_through_exit() {
    // with a two-tick range over a day, the floor sits at max_tick for many
    // early epochs and their tranches cannot back a position yet; they must
    // be carried forward, not dropped
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    init(&mut host, &mut engine, key, day_config(-1, 1), 9_000);

    let mut t = 10_800;
    while t < 10_000 + 86_400 + 2 * 3_600 {
        host.set_now(t);
        engine.sync(&mut host, &key).unwrap();
        let state = engine.pool(&key).unwrap();
        // everything committed so far is either in the live position or
        // waiting in the carry-forward bucket
        if state.floor_tick == 1 {
            assert_eq!(state.unplaced, state.amount_committed);
        }
        t += 3_600;
    }

    let state = engine.pool(&key).unwrap();
    assert_eq!(state.amount_committed, TOTAL);
    assert_eq!(state.floor_tick, -1);
    assert_eq!(state.unplaced, 0);

    engine.exit(&mut host, &key, OWNER).unwrap();
    let returned = host.balance_of(BOOT, OWNER);
    assert!(returned <= TOTAL);
    // dust grows with the number of close/reopen cycles (one per epoch here)
    assert!(TOTAL - returned <= 40, "lost {} base units", TOTAL - returned);
}

#[test]
fn exit_is_owner_only_and_gated_on_the_epoch_boundary() {
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    init(&mut host, &mut engine, key, day_config(0, 5_000), 9_000);

    host.set_now(50_000);
    assert_eq!(
        engine.exit(&mut host, &key, OWNER),
        Err(EngineError::BeforeEndTime)
    );

    // end_time itself is not epoch-aligned: the owner has to wait for the
    // next boundary past it
    host.set_now(10_000 + 86_400);
    assert_eq!(
        engine.exit(&mut host, &key, OWNER),
        Err(EngineError::BeforeEndTime)
    );

    host.set_now(97_200);
    assert_eq!(
        engine.exit(&mut host, &key, TRADER),
        Err(EngineError::Unauthorized)
    );
    engine.exit(&mut host, &key, OWNER).unwrap();
    // repeat exits are harmless
    engine.exit(&mut host, &key, OWNER).unwrap();
}

#[test]
fn host_swaps_trigger_the_epoch_sync() {
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    init(&mut host, &mut engine, key, day_config(0, 5_000), 9_000);
    host.mint(QUOTE, TRADER, 10u128.pow(24));

    // before the window the hook acknowledges without syncing
    host.set_now(9_999);
    taper_amm::swap(
        &mut host,
        &mut engine,
        TRADER,
        &key,
        &SwapParams {
            zero_for_one: false,
            amount_in: 10u128.pow(18),
            sqrt_price_limit_x64: get_sqrt_price_at_tick(7_500).unwrap(),
        },
    )
    .unwrap();
    assert_eq!(engine.pool(&key).unwrap().amount_committed, 0);

    // mid-window the same swap first syncs the epoch (forced sell down to
    // 2870, position at 2871..5000), then buys out of the fresh position
    host.set_now(50_000);
    let outcome = taper_amm::swap(
        &mut host,
        &mut engine,
        TRADER,
        &key,
        &SwapParams {
            zero_for_one: false,
            amount_in: 10u128.pow(18),
            sqrt_price_limit_x64: get_sqrt_price_at_tick(7_500).unwrap(),
        },
    )
    .unwrap();
    let state = engine.pool(&key).unwrap();
    assert_eq!(state.amount_committed, 425_925_925_925_925_925_925);
    assert_eq!(state.floor_tick, 2_871);
    // the sync's internal sell re-entered before_swap exactly once and was
    // waved through; the epoch was processed a single time
    assert_eq!(state.synced_epochs.len(), 1);
    assert!(!state.in_internal_swap);
    assert!(outcome.amount_out > 0, "trader bought from the new position");
    assert_eq!(host.balance_of(BOOT, TRADER), outcome.amount_out);
    assert!(host.slot0(&key).unwrap().tick > 2_870);
}

#[test]
fn invalid_configs_are_rejected_at_init() {
    let (mut host, mut engine, key) = setup(SQRT_2_1_X64);
    host.set_now(50_000);
    host.mint(BOOT, OWNER, TOTAL);

    let valid = BootstrapConfig {
        total_amount: TOTAL,
        start_time: 60_000,
        end_time: 120_000,
        min_tick: 0,
        max_tick: 5_000,
        is_token0: true,
    };

    let started_after_end = BootstrapConfig {
        start_time: 120_000,
        end_time: 60_000,
        ..valid
    };
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, key, started_after_end, EPOCH),
        Err(EngineError::InvalidTimeRange)
    );

    let already_over = BootstrapConfig {
        start_time: 10_000,
        end_time: 49_999,
        ..valid
    };
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, key, already_over, EPOCH),
        Err(EngineError::InvalidTimeRange)
    );

    let inverted_ticks = BootstrapConfig {
        min_tick: 5_000,
        max_tick: 0,
        ..valid
    };
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, key, inverted_ticks, EPOCH),
        Err(EngineError::InvalidTickRange)
    );

    assert_eq!(
        engine.after_initialize(&mut host, OWNER, key, valid, 0),
        Err(EngineError::InvalidEpochSize)
    );

    // a coarse-spacing pool rejects bounds outside its usable tick range
    let coarse = PoolKey::new(TokenId(3), TokenId(4), 60);
    host.create_pool(coarse, SQRT_2_1_X64).unwrap();
    host.mint(TokenId(3), OWNER, TOTAL);

    let below_usable = BootstrapConfig {
        min_tick: -443_600,
        max_tick: 0,
        ..valid
    };
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, coarse, below_usable, EPOCH),
        Err(EngineError::InvalidTickRange)
    );

    let above_usable = BootstrapConfig {
        min_tick: 0,
        max_tick: 443_600,
        ..valid
    };
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, coarse, above_usable, EPOCH),
        Err(EngineError::InvalidTickRange)
    );

    // nothing was recorded or pulled
    assert!(engine.pool(&key).is_none());
    assert_eq!(host.balance_of(BOOT, OWNER), TOTAL);

    // and a valid config on a missing pool surfaces the host failure
    let missing = PoolKey::new(TokenId(8), TokenId(9), 1);
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, missing, valid, EPOCH),
        Err(EngineError::Host(AmmError::UnknownPool))
    );

    // double registration is rejected
    engine
        .after_initialize(&mut host, OWNER, key, valid, EPOCH)
        .unwrap();
    host.mint(BOOT, OWNER, TOTAL);
    assert_eq!(
        engine.after_initialize(&mut host, OWNER, key, valid, EPOCH),
        Err(EngineError::AlreadyInitialized)
    );
}
