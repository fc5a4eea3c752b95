//! Forecast aggregation.
//!
//! Pure functions (no I/O) turning the flat list of 3-hour samples from the
//! `/forecast` endpoint into the `hourly` and `daily` series of a snapshot.
//! Empty input yields empty output; nothing here can fail.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::collections::HashMap;

use crate::services::openweather::ForecastSample;
use crate::services::snapshot::{DailyFeelsLike, DailyForecast, DailyTemperature, HourlyForecast};

/// Number of 3-hour samples exposed as the hourly series (~24h).
pub const HOURLY_LIMIT: usize = 8;

/// Number of calendar days exposed as the daily series.
pub const DAILY_LIMIT: usize = 6;

/// Pass the first [`HOURLY_LIMIT`] samples through unchanged, in input order.
pub(crate) fn to_hourly(samples: &[ForecastSample]) -> Vec<HourlyForecast> {
    samples
        .iter()
        .take(HOURLY_LIMIT)
        .map(|s| HourlyForecast {
            dt: s.dt,
            temp: s.main.temp,
            feels_like: s.main.feels_like,
            pressure: s.main.pressure,
            humidity: s.main.humidity,
            dew_point: 0.0,
            uvi: 0.0,
            clouds: s.clouds.all,
            visibility: 0,
            wind_speed: s.wind.speed,
            wind_deg: s.wind.deg,
            wind_gust: s.wind.gust,
            weather: s.weather.clone(),
            pop: s.pop,
        })
        .collect()
}

/// Bucket samples by calendar day in the process's local time zone.
pub(crate) fn to_daily(samples: &[ForecastSample]) -> Vec<DailyForecast> {
    to_daily_in(samples, &Local)
}

/// Bucket samples by calendar day as seen in `tz`.
///
/// Days appear in the order they are first encountered in `samples` (not
/// sorted) and only the first [`DAILY_LIMIT`] days are kept. Within a day:
/// - `temp.min` / `temp.max` are the extremes of `temp_min` / `temp_max`
/// - `pop` is the highest probability of precipitation
/// - everything else comes from the representative sample at index `len / 2`
pub(crate) fn to_daily_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailyForecast> {
    let mut day_index: HashMap<NaiveDate, usize> = HashMap::new();
    let mut days: Vec<Vec<&ForecastSample>> = Vec::new();

    for sample in samples {
        let Some(date) = local_date(sample.dt, tz) else {
            tracing::debug!("Skipping forecast sample with out-of-range timestamp {}", sample.dt);
            continue;
        };

        match day_index.get(&date) {
            Some(&idx) => days[idx].push(sample),
            None => {
                day_index.insert(date, days.len());
                days.push(vec![sample]);
            }
        }
    }

    days.truncate(DAILY_LIMIT);

    days.iter()
        .filter_map(|group| summarize_day(group))
        .collect()
}

/// Calendar date of a unix timestamp in `tz`.
fn local_date<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|utc| utc.with_timezone(tz).date_naive())
}

/// Index of the representative sample for a day with `count` samples.
pub(crate) fn representative_index(count: usize) -> usize {
    count / 2
}

fn summarize_day(group: &[&ForecastSample]) -> Option<DailyForecast> {
    let first = group.first()?;
    let rep = group[representative_index(group.len())];

    let (min, max, pop) = group.iter().fold(
        (first.main.temp_min, first.main.temp_max, first.pop),
        |(min, max, pop), s| {
            (
                min.min(s.main.temp_min),
                max.max(s.main.temp_max),
                pop.max(s.pop),
            )
        },
    );

    let summary = rep
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_default();

    Some(DailyForecast {
        dt: rep.dt,
        // Not reported per day by the 3-hour forecast endpoint
        sunrise: 0,
        sunset: 0,
        moonrise: 0,
        moonset: 0,
        moon_phase: 0.0,
        summary,
        temp: DailyTemperature {
            day: rep.main.temp,
            min,
            max,
            ..Default::default()
        },
        feels_like: DailyFeelsLike {
            day: rep.main.feels_like,
            ..Default::default()
        },
        pressure: rep.main.pressure,
        humidity: rep.main.humidity,
        dew_point: 0.0,
        wind_speed: rep.wind.speed,
        wind_deg: rep.wind.deg,
        wind_gust: rep.wind.gust,
        weather: rep.weather.clone(),
        clouds: rep.clouds.all,
        pop,
        uvi: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openweather::{OwmClouds, SampleMain, SampleWind};
    use crate::services::snapshot::WeatherCondition;
    use chrono::{FixedOffset, Utc};

    /// 2026-03-01T12:00:00Z
    const MAR1_NOON: i64 = 1772366400;
    const DAY: i64 = 86400;
    const STEP: i64 = 10800;

    fn sample(dt: i64, temp: f64) -> ForecastSample {
        ForecastSample {
            dt,
            main: SampleMain {
                temp,
                feels_like: temp - 1.0,
                temp_min: temp - 2.0,
                temp_max: temp + 2.0,
                pressure: 1000 + (temp as i32),
                humidity: 50,
            },
            weather: vec![WeatherCondition {
                id: 800,
                main: "Clear".to_string(),
                description: format!("sample at {}", dt),
                icon: "01d".to_string(),
            }],
            clouds: OwmClouds { all: 10 },
            wind: SampleWind {
                speed: temp / 10.0,
                deg: 90,
                gust: 5.5,
            },
            pop: 0.0,
        }
    }

    fn with_envelope(mut s: ForecastSample, min: f64, max: f64, pop: f64) -> ForecastSample {
        s.main.temp_min = min;
        s.main.temp_max = max;
        s.pop = pop;
        s
    }

    #[test]
    fn test_hourly_caps_at_eight() {
        let samples: Vec<_> = (0..40).map(|i| sample(MAR1_NOON + i * STEP, i as f64)).collect();
        let hourly = to_hourly(&samples);
        assert_eq!(hourly.len(), 8);
        for (i, h) in hourly.iter().enumerate() {
            assert_eq!(h.dt, samples[i].dt);
        }
    }

    #[test]
    fn test_hourly_short_input_is_direct_passthrough() {
        let samples: Vec<_> = (0..3).map(|i| sample(MAR1_NOON + i * STEP, 10.0 + i as f64)).collect();
        let hourly = to_hourly(&samples);
        assert_eq!(hourly.len(), 3);

        let h = &hourly[1];
        let s = &samples[1];
        assert_eq!(h.dt, s.dt);
        assert_eq!(h.temp, s.main.temp);
        assert_eq!(h.feels_like, s.main.feels_like);
        assert_eq!(h.pressure, s.main.pressure);
        assert_eq!(h.humidity, s.main.humidity);
        assert_eq!(h.clouds, s.clouds.all);
        assert_eq!(h.wind_speed, s.wind.speed);
        assert_eq!(h.wind_deg, s.wind.deg);
        assert_eq!(h.wind_gust, s.wind.gust);
        assert_eq!(h.pop, s.pop);
        assert_eq!(h.weather, s.weather);
    }

    #[test]
    fn test_hourly_does_not_reorder() {
        let samples = vec![
            sample(MAR1_NOON + 2 * STEP, 1.0),
            sample(MAR1_NOON, 2.0),
            sample(MAR1_NOON + STEP, 3.0),
        ];
        let dts: Vec<i64> = to_hourly(&samples).iter().map(|h| h.dt).collect();
        assert_eq!(dts, vec![MAR1_NOON + 2 * STEP, MAR1_NOON, MAR1_NOON + STEP]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(to_hourly(&[]).is_empty());
        assert!(to_daily_in(&[], &Utc).is_empty());
    }

    #[test]
    fn test_daily_order_is_first_seen_not_sorted() {
        let mar2 = MAR1_NOON + DAY;
        let mar3 = MAR1_NOON + 2 * DAY;
        let samples = vec![
            sample(mar2, 1.0),
            sample(MAR1_NOON, 2.0),
            sample(mar2 + STEP, 3.0),
            sample(mar3, 4.0),
        ];

        let daily = to_daily_in(&samples, &Utc);
        assert_eq!(daily.len(), 3);

        let dates: Vec<NaiveDate> = daily
            .iter()
            .map(|d| local_date(d.dt, &Utc).unwrap())
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_daily_caps_at_six_days() {
        // Seven calendar days in UTC: 4 samples on Mar 1, then 8 per day
        let samples: Vec<_> = (0..52).map(|i| sample(MAR1_NOON + i * STEP, i as f64)).collect();
        let daily = to_daily_in(&samples, &Utc);
        assert_eq!(daily.len(), 6);
        for w in daily.windows(2) {
            assert!(w[0].dt < w[1].dt);
        }
    }

    #[test]
    fn test_daily_envelope_uses_temp_min_and_temp_max() {
        let samples = vec![
            with_envelope(sample(MAR1_NOON - 3 * STEP, 15.0), 10.0, 20.0, 0.2),
            with_envelope(sample(MAR1_NOON - 2 * STEP, 15.0), 8.0, 22.0, 0.7),
            with_envelope(sample(MAR1_NOON - STEP, 15.0), 12.0, 18.0, 0.1),
        ];
        let daily = to_daily_in(&samples, &Utc);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].temp.min, 8.0);
        assert_eq!(daily[0].temp.max, 22.0);
        assert_eq!(daily[0].pop, 0.7);
    }

    #[test]
    fn test_daily_envelope_ignores_temp_field() {
        // temp itself falls outside temp_min/temp_max; only the envelope fields count
        let samples = vec![
            with_envelope(sample(MAR1_NOON, -30.0), 1.0, 2.0, 0.0),
            with_envelope(sample(MAR1_NOON + STEP, 50.0), 1.5, 2.5, 0.0),
        ];
        let daily = to_daily_in(&samples, &Utc);
        assert_eq!(daily[0].temp.min, 1.0);
        assert_eq!(daily[0].temp.max, 2.5);
    }

    #[test]
    fn test_representative_index() {
        assert_eq!(representative_index(1), 0);
        assert_eq!(representative_index(2), 1);
        assert_eq!(representative_index(4), 2);
        assert_eq!(representative_index(5), 2);
        assert_eq!(representative_index(8), 4);
    }

    #[test]
    fn test_daily_fields_come_from_representative_sample() {
        // Five samples on 2026-03-01 (UTC): 00:00 .. 12:00
        let base = MAR1_NOON - 4 * STEP;
        let samples: Vec<_> = (0..5).map(|i| sample(base + i * STEP, 10.0 + i as f64)).collect();
        let daily = to_daily_in(&samples, &Utc);
        assert_eq!(daily.len(), 1);

        let rep = &samples[2];
        let d = &daily[0];
        assert_eq!(d.dt, rep.dt);
        assert_eq!(d.temp.day, rep.main.temp);
        assert_eq!(d.feels_like.day, rep.main.feels_like);
        assert_eq!(d.pressure, rep.main.pressure);
        assert_eq!(d.humidity, rep.main.humidity);
        assert_eq!(d.wind_speed, rep.wind.speed);
        assert_eq!(d.wind_deg, rep.wind.deg);
        assert_eq!(d.wind_gust, rep.wind.gust);
        assert_eq!(d.clouds, rep.clouds.all);
        assert_eq!(d.weather, rep.weather);
        assert_eq!(d.summary, format!("sample at {}", rep.dt));
    }

    #[test]
    fn test_daily_sun_and_moon_fields_are_zero() {
        let daily = to_daily_in(&[sample(MAR1_NOON, 5.0)], &Utc);
        let d = &daily[0];
        assert_eq!(d.sunrise, 0);
        assert_eq!(d.sunset, 0);
        assert_eq!(d.moonrise, 0);
        assert_eq!(d.moonset, 0);
        assert_eq!(d.moon_phase, 0.0);
        assert_eq!(d.temp.night, 0.0);
    }

    #[test]
    fn test_daily_summary_empty_without_conditions() {
        let mut s = sample(MAR1_NOON, 5.0);
        s.weather.clear();
        let daily = to_daily_in(&[s], &Utc);
        assert_eq!(daily[0].summary, "");
        assert!(daily[0].weather.is_empty());
    }

    #[test]
    fn test_daily_boundary_follows_time_zone() {
        // 2026-03-01T22:00Z and 2026-03-02T01:00Z: two UTC days, one day at UTC-3
        let late = MAR1_NOON + 10 * 3600;
        let samples = vec![sample(late, 1.0), sample(late + STEP, 2.0)];

        assert_eq!(to_daily_in(&samples, &Utc).len(), 2);

        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let daily = to_daily_in(&samples, &brt);
        assert_eq!(daily.len(), 1);
        // Two samples: representative is index 1
        assert_eq!(daily[0].dt, late + STEP);
    }

    #[test]
    fn test_daily_local_zone_groups_same_day_samples() {
        let samples = vec![sample(MAR1_NOON, 1.0), sample(MAR1_NOON, 2.0)];
        assert_eq!(to_daily(&samples).len(), 1);
    }
}
