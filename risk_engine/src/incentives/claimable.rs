use common_errors::{ERROR_RESERVE_MISMATCH, ERROR_UNKNOWN_RESERVE};
use common_structs::{
    AccruedReward, ClaimableRewards, ReserveIncentives, ReserveSnapshot, UserReserveIncentives,
    UserReservePosition,
};
use log::{debug, trace};

use crate::{
    config::FormatOptions,
    format::{buffer_to_string, FormatModule},
    incentives::{accrual::IncentiveAccrualModule, FormattedClaimableReward, INCENTIVE_SIDES},
    reserves::ReserveModule,
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait ClaimableRewardsModule:
    common_rates::InterestRates
    + common_math::SharedMathModule
    + crate::format::FormatModule
    + crate::reserves::ReserveModule
    + crate::incentives::accrual::IncentiveAccrualModule
{
    /// Rewards a user accrued on every side of one reserve since the reward
    /// indexes were last written on chain.
    ///
    /// User rewards without a matching reserve stream accrue nothing but
    /// still carry their unclaimed balance. A missing position or a side
    /// with no token supply accrues nothing.
    fn calculate_user_reserve_incentives(
        &self,
        reserve_incentives: &ReserveIncentives<Self::Api>,
        user_incentives: &UserReserveIncentives<Self::Api>,
        reserve: &ReserveSnapshot<Self::Api>,
        position: Option<&UserReservePosition<Self::Api>>,
        current_timestamp: u64,
    ) -> Vec<AccruedReward<Self::Api>> {
        require!(
            reserve_incentives.underlying_asset == user_incentives.underlying_asset
                && reserve.underlying_asset == user_incentives.underlying_asset,
            ERROR_RESERVE_MISMATCH
        );

        let mut rewards = Vec::new();
        for kind in INCENTIVE_SIDES {
            let side = reserve_incentives.side(kind);
            let user_side = user_incentives.side(kind);
            if user_side.user_rewards.is_empty() {
                continue;
            }

            let total_supply = self.calculate_incentive_total_supply(reserve, kind);
            let principal = self.incentive_principal(position, kind);

            for user_reward in &user_side.user_rewards {
                let stream = side
                    .rewards
                    .iter()
                    .find(|stream| stream.reward_token_address == user_reward.reward_token_address);

                let accrued = match stream {
                    Some(stream) if total_supply == BigUint::zero() => {
                        self.to_decimal(BigUint::zero(), stream.precision)
                    },
                    Some(stream) => {
                        let reserve_index =
                            self.calculate_current_index(stream, &total_supply, current_timestamp);
                        self.calculate_accrued_incentives(
                            &principal,
                            &reserve_index,
                            &user_reward.token_incentives_user_index,
                            stream.precision,
                        )
                    },
                    None => self.to_decimal(BigUint::zero(), 0),
                };

                rewards.push(AccruedReward {
                    incentive_controller_address: user_side.incentive_controller_address.clone(),
                    token_address: user_side.token_address.clone(),
                    reward_token_address: user_reward.reward_token_address.clone(),
                    reward_token_symbol: user_reward.reward_token_symbol.clone(),
                    accrued,
                    unclaimed: user_reward.user_unclaimed_rewards.clone(),
                    reward_price_feed: user_reward.reward_price_feed.clone(),
                    price_feed_decimals: user_reward.price_feed_decimals,
                    reward_token_decimals: user_reward.reward_token_decimals,
                });
            }
        }

        rewards
    }

    /// Claimable balance per (incentive controller, reward token) across all
    /// reserves and sides.
    ///
    /// The unclaimed balance reported by the controller is per user and
    /// reward, so it is counted once per key; accrued amounts add up.
    fn calculate_all_user_incentives(
        &self,
        reserves: &[ReserveSnapshot<Self::Api>],
        positions: &[UserReservePosition<Self::Api>],
        reserve_incentives: &[ReserveIncentives<Self::Api>],
        user_incentives: &[UserReserveIncentives<Self::Api>],
        current_timestamp: u64,
    ) -> Vec<ClaimableRewards<Self::Api>> {
        debug!(
            "aggregating incentives of {} reserves at {}",
            user_incentives.len(),
            current_timestamp
        );

        let mut claimables: Vec<ClaimableRewards<Self::Api>> = Vec::new();
        for user_reserve in user_incentives {
            let asset = &user_reserve.underlying_asset;
            let reserve = match reserves.iter().find(|r| &r.underlying_asset == asset) {
                Some(reserve) => reserve,
                None => sc_panic!(ERROR_UNKNOWN_RESERVE),
            };
            let incentives = match reserve_incentives
                .iter()
                .find(|incentives| &incentives.underlying_asset == asset)
            {
                Some(incentives) => incentives,
                None => sc_panic!(ERROR_UNKNOWN_RESERVE),
            };
            let position = positions
                .iter()
                .find(|position| &position.reserve.underlying_asset == asset);

            let rewards = self.calculate_user_reserve_incentives(
                incentives,
                user_reserve,
                reserve,
                position,
                current_timestamp,
            );

            for reward in rewards {
                trace!(
                    "reward {} from {} on {}",
                    buffer_to_string(&reward.reward_token_address),
                    buffer_to_string(&reward.incentive_controller_address),
                    buffer_to_string(&reward.token_address)
                );

                let existing = claimables.iter_mut().find(|claimable| {
                    claimable.incentive_controller_address == reward.incentive_controller_address
                        && claimable.reward_token_address == reward.reward_token_address
                });

                match existing {
                    Some(claimable) => {
                        claimable.claimable_rewards =
                            self.add_exact(&claimable.claimable_rewards, &reward.accrued);
                        if !claimable.asset_addresses.contains(&reward.token_address) {
                            claimable.asset_addresses.push(reward.token_address.clone());
                        }
                    },
                    None => {
                        let unclaimed = self.to_decimal(reward.unclaimed.clone(), 0);
                        claimables.push(ClaimableRewards {
                            incentive_controller_address: reward.incentive_controller_address,
                            reward_token_address: reward.reward_token_address,
                            reward_token_symbol: reward.reward_token_symbol,
                            asset_addresses: vec![reward.token_address],
                            claimable_rewards: self.add_exact(&unclaimed, &reward.accrued),
                            reward_price_feed: reward.reward_price_feed,
                            price_feed_decimals: reward.price_feed_decimals,
                            reward_token_decimals: reward.reward_token_decimals,
                        });
                    },
                }
            }
        }

        claimables
    }

    /// Normalizes by the reward token decimals and values the amount with
    /// the reward price feed.
    fn format_claimable_rewards(
        &self,
        claimables: &[ClaimableRewards<Self::Api>],
        options: &FormatOptions,
    ) -> Vec<FormattedClaimableReward> {
        claimables
            .iter()
            .map(|claimable| {
                let amount = &claimable.claimable_rewards;
                let value = self.to_decimal(
                    amount.into_raw_units() * &claimable.reward_price_feed,
                    amount.scale() + claimable.price_feed_decimals,
                );

                FormattedClaimableReward {
                    incentive_controller_address: buffer_to_string(
                        &claimable.incentive_controller_address,
                    ),
                    reward_token_address: buffer_to_string(&claimable.reward_token_address),
                    reward_token_symbol: buffer_to_string(&claimable.reward_token_symbol),
                    asset_addresses: claimable
                        .asset_addresses
                        .iter()
                        .map(|address| buffer_to_string(address))
                        .collect(),
                    claimable_rewards: self.format_decimal(
                        amount,
                        claimable.reward_token_decimals,
                        options,
                    ),
                    claimable_rewards_usd: self.format_decimal(
                        &value,
                        claimable.reward_token_decimals,
                        options,
                    ),
                }
            })
            .collect()
    }
}
