//! Account creation date estimate.
//!
//! Telegram user IDs grow roughly with registration time. A table of known
//! `(user id, registration timestamp)` anchors is interpolated linearly to
//! guess when an account was created; the account's age drives the
//! loyalty reward tier.

use chrono::{DateTime, Months, Utc};

/// Known `(telegram user id, unix timestamp)` anchors, sorted by id.
///
/// Timestamps are not monotonic in id; interpolation works on each
/// bracketing pair as-is.
const ANCHORS: &[(i64, i64)] = &[
    (1_000_000, 1_380_326_400),
    (2_768_409, 1_383_264_000),
    (7_679_610, 1_388_448_000),
    (11_538_514, 1_391_212_000),
    (15_835_244, 1_392_940_000),
    (23_646_077, 1_393_459_000),
    (38_015_510, 1_393_632_000),
    (44_634_663, 1_399_334_000),
    (46_145_305, 1_400_198_000),
    (54_845_238, 1_411_257_000),
    (63_263_518, 1_414_454_000),
    (101_260_938, 1_425_600_000),
    (101_323_197, 1_426_204_000),
    (103_151_531, 1_433_376_000),
    (103_258_382, 1_432_771_000),
    (109_393_468, 1_439_078_000),
    (111_220_210, 1_429_574_000),
    (112_594_714, 1_439_683_000),
    (116_812_045, 1_437_696_000),
    (122_600_695, 1_437_782_000),
    (124_872_445, 1_439_856_000),
    (125_828_524, 1_444_003_000),
    (130_029_930, 1_441_324_000),
    (133_909_606, 1_444_176_000),
    (143_445_125, 1_448_928_000),
    (148_670_295, 1_452_211_000),
    (152_079_341, 1_453_420_000),
    (157_242_073, 1_446_768_000),
    (171_295_414, 1_457_481_000),
    (181_783_990, 1_460_246_000),
    (222_021_233, 1_465_344_000),
    (225_034_354, 1_466_208_000),
    (278_941_742, 1_473_465_000),
    (285_253_072, 1_476_835_000),
    (294_851_037, 1_479_600_000),
    (297_621_225, 1_481_846_000),
    (328_594_461, 1_482_969_000),
    (337_808_429, 1_487_707_000),
    (341_546_272, 1_487_782_000),
    (352_940_995, 1_487_894_000),
    (369_669_043, 1_490_918_000),
    (400_169_472, 1_501_459_000),
    (616_816_630, 1_529_625_600),
    (681_896_077, 1_532_821_500),
    (727_572_658, 1_543_708_800),
    (796_147_074, 1_541_371_800),
    (925_078_064, 1_563_290_000),
    (928_636_984, 1_581_513_420),
    (1_054_883_348, 1_585_674_420),
    (1_057_704_545, 1_580_393_640),
    (1_145_856_008, 1_586_342_040),
    (1_227_964_864, 1_596_127_860),
    (1_382_531_194, 1_600_188_120),
    (1_658_586_909, 1_613_148_540),
    (1_660_971_491, 1_613_329_440),
    (1_692_464_211, 1_615_402_500),
    (1_719_536_397, 1_619_293_500),
    (1_721_844_091, 1_620_224_820),
    (1_772_991_138, 1_617_540_360),
    (1_807_942_741, 1_625_520_300),
    (1_893_429_550, 1_622_040_000),
    (1_972_424_006, 1_631_669_400),
    (1_974_255_900, 1_634_000_000),
    (2_030_606_431, 1_631_992_680),
    (2_041_327_411, 1_631_989_620),
    (2_078_711_279, 1_634_321_820),
    (2_104_178_931, 1_638_353_220),
    (2_120_496_865, 1_636_714_020),
    (2_123_596_685, 1_636_503_180),
    (2_138_472_342, 1_637_590_800),
    (3_318_845_111, 1_618_028_800),
    (4_317_845_111, 1_620_028_800),
    (5_162_494_923, 1_652_449_800),
    (5_186_883_095, 1_648_764_360),
    (5_304_951_856, 1_656_718_440),
    (5_317_829_834, 1_653_152_820),
    (5_318_092_331, 1_652_024_220),
    (5_336_336_790, 1_646_368_100),
    (5_362_593_868, 1_652_024_520),
    (5_387_234_031, 1_662_137_700),
    (5_396_587_273, 1_648_014_800),
    (5_409_444_610, 1_659_025_020),
    (5_416_026_704, 1_660_925_460),
    (5_465_223_076, 1_661_710_860),
    (5_480_654_757, 1_660_926_300),
    (5_499_934_702, 1_662_130_740),
    (5_513_192_189, 1_659_626_400),
    (5_522_237_606, 1_654_167_240),
    (5_537_251_684, 1_664_269_800),
    (5_559_167_331, 1_656_718_560),
    (5_568_348_673, 1_654_642_200),
    (5_591_759_222, 1_659_025_500),
    (5_608_562_550, 1_664_012_820),
    (5_614_111_200, 1_661_780_160),
    (5_666_819_340, 1_664_112_240),
    (5_684_254_605, 1_662_134_040),
    (5_684_689_868, 1_661_304_720),
    (5_707_112_959, 1_663_803_300),
    (5_756_095_415, 1_660_925_940),
    (5_772_670_706, 1_661_539_140),
    (5_778_063_231, 1_667_477_640),
    (5_802_242_180, 1_671_821_040),
    (5_853_442_730, 1_674_866_100),
    (5_859_878_513, 1_673_117_760),
    (5_885_964_106, 1_671_081_840),
    (5_982_648_124, 1_686_941_700),
    (6_020_888_206, 1_675_534_800),
    (6_032_606_998, 1_686_998_640),
    (6_057_123_350, 1_676_198_350),
    (6_058_560_984, 1_686_907_980),
    (6_101_607_245, 1_686_830_760),
    (6_108_011_341, 1_681_032_060),
    (6_132_325_730, 1_692_033_840),
    (6_182_056_052, 1_687_870_740),
    (6_279_839_148, 1_688_399_160),
    (6_306_077_724, 1_692_442_920),
    (6_321_562_426, 1_688_486_760),
    (6_364_973_680, 1_696_349_340),
    (6_386_727_079, 1_691_696_880),
    (6_429_580_803, 1_692_082_680),
    (6_527_226_055, 1_690_289_160),
    (6_813_121_418, 1_698_489_600),
    (6_865_576_492, 1_699_052_400),
    (6_925_870_357, 1_701_192_327),
];

/// Reward for accounts at least this many full years old.
pub const MAX_REWARD: u32 = 7500;

/// Reward step per full year of account age.
const REWARD_PER_YEAR: u32 = 750;

/// Estimated registration timestamp (unix seconds) for a Telegram user ID.
///
/// IDs below the first anchor get the first anchor's time, IDs above the
/// last anchor get the last anchor's time.
pub fn predict_creation_timestamp(user_id: i64) -> i64 {
    let (Some(&(first_id, first_ts)), Some(&(_, last_ts))) = (ANCHORS.first(), ANCHORS.last())
    else {
        return 0;
    };

    if user_id <= first_id {
        return first_ts;
    }

    ANCHORS
        .windows(2)
        .find_map(|pair| match pair {
            [(lo_id, lo_ts), (hi_id, hi_ts)] if *lo_id <= user_id && user_id <= *hi_id => {
                let t = (user_id - lo_id) as f64 / (hi_id - lo_id) as f64;
                Some((*lo_ts as f64 + t * (hi_ts - lo_ts) as f64) as i64)
            }
            _ => None,
        })
        .unwrap_or(last_ts)
}

/// Estimated registration time for a Telegram user ID.
pub fn predict_creation_date(user_id: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(predict_creation_timestamp(user_id), 0).unwrap_or_default()
}

/// Calendar age in whole months, like `relativedelta(now, created)`.
///
/// Returns 0 when `created` is after `now`.
pub fn account_age_months(created: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    if created >= now {
        return 0;
    }

    let months = months_between_calendar(created, now);
    let reached = created
        .checked_add_months(Months::new(months))
        .is_some_and(|anniversary| anniversary <= now);

    if reached {
        months
    } else {
        months.saturating_sub(1)
    }
}

/// Account age in years: whole years plus remaining whole months / 12.
pub fn account_age_years(created: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let months = account_age_months(created, now);
    f64::from(months / 12) + f64::from(months % 12) / 12.0
}

/// Round to one decimal place.
pub fn years_rounded(years: f64) -> f64 {
    (years * 10.0).round() / 10.0
}

/// Reward tier for an account age: 750 per started year, capped at 7500.
pub fn reward_for_years(years: f64) -> u32 {
    if !years.is_finite() || years < 0.0 {
        return REWARD_PER_YEAR;
    }

    // Truncation is the tier boundary.
    let full_years = years.trunc().min(9.0) as u32;
    REWARD_PER_YEAR
        .saturating_mul(full_years + 1)
        .min(MAX_REWARD)
}

fn months_between_calendar(created: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    use chrono::Datelike;

    let years = i64::from(now.year()) - i64::from(created.year());
    let months = years * 12 + i64::from(now.month()) - i64::from(created.month());
    u32::try_from(months).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_anchors_sorted_by_id() {
        assert!(ANCHORS.windows(2).all(|w| match w {
            [(a, _), (b, _)] => a < b,
            _ => false,
        }));
    }

    #[test]
    fn test_prediction_clamps_below_first_anchor() {
        assert_eq!(predict_creation_timestamp(1), 1_380_326_400);
        assert_eq!(predict_creation_timestamp(-5), 1_380_326_400);
        assert_eq!(predict_creation_timestamp(1_000_000), 1_380_326_400);
    }

    #[test]
    fn test_prediction_clamps_above_last_anchor() {
        assert_eq!(predict_creation_timestamp(9_999_999_999), 1_701_192_327);
    }

    #[test]
    fn test_prediction_hits_anchor_exactly() {
        assert_eq!(predict_creation_timestamp(400_169_472), 1_501_459_000);
    }

    #[test]
    fn test_prediction_interpolates_between_anchors() {
        // Halfway between 1_000_000 and 2_768_409.
        let mid = 1_000_000 + (2_768_409 - 1_000_000) / 2;
        let ts = predict_creation_timestamp(mid);
        let expected = 1_380_326_400 + (1_383_264_000 - 1_380_326_400) / 2;
        assert!((ts - expected).abs() <= 1, "ts={ts} expected={expected}");
    }

    #[test]
    fn test_account_age_months_respects_day_of_month() {
        assert_eq!(account_age_months(at(2020, 3, 15), at(2021, 3, 14)), 11);
        assert_eq!(account_age_months(at(2020, 3, 15), at(2021, 3, 15)), 12);
        assert_eq!(account_age_months(at(2020, 1, 31), at(2020, 2, 29)), 1);
        assert_eq!(account_age_months(at(2022, 1, 1), at(2021, 1, 1)), 0);
    }

    #[test]
    fn test_account_age_years() {
        let years = account_age_years(at(2020, 1, 1), at(2022, 7, 1));
        assert!((years - 2.5).abs() < f64::EPSILON);
        assert!((years_rounded(2.0 + 7.0 / 12.0) - 2.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reward_tiers() {
        assert_eq!(reward_for_years(0.0), 750);
        assert_eq!(reward_for_years(0.9), 750);
        assert_eq!(reward_for_years(1.0), 1500);
        assert_eq!(reward_for_years(4.5), 3750);
        assert_eq!(reward_for_years(9.9), 7500);
        assert_eq!(reward_for_years(10.0), MAX_REWARD);
        assert_eq!(reward_for_years(25.0), MAX_REWARD);
    }

    #[test]
    fn test_predicted_date_of_old_account() {
        let created = predict_creation_date(1);
        let now = at(2024, 10, 1);
        // 2013-09-28 → 2024-10-01 is eleven years and change.
        assert_eq!(reward_for_years(account_age_years(created, now)), MAX_REWARD);
    }
}
