use async_trait::async_trait;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use price_history::{
    HistoryError, HistoryNormalizer,
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
        timeframe::TimeFrame,
        window::LookbackBounds,
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};
use proptest::prelude::*;
use std::sync::Mutex;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

fn bar_on(date: NaiveDate, base: f64) -> Bar {
    let ts = Utc.from_utc_datetime(&date.and_hms_opt(13, 30, 0).unwrap());
    Bar {
        timestamp: ts,
        trading_date: date,
        open: base,
        high: base + 2.0,
        low: base - 1.0,
        close: base + 1.0,
        volume: Some(10_000.0),
    }
}

/// Five consecutive sessions ending the day before `today()`.
fn five_bars() -> Vec<Bar> {
    (1..=5u64)
        .rev()
        .map(|back| bar_on(today().checked_sub_days(Days::new(back)).unwrap(), 100.0 + back as f64))
        .collect()
}

/// Serves a fixed answer and remembers what it was asked.
struct FakeProvider {
    answer: Result<Vec<BarSeries>, u16>,
    seen: Mutex<Vec<BarsRequestParams>>,
}

impl FakeProvider {
    fn with_series(series: Vec<BarSeries>) -> Self {
        Self {
            answer: Ok(series),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            answer: Err(status),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        self.seen.lock().unwrap().push(params);
        match &self.answer {
            Ok(series) => Ok(series.clone()),
            Err(status) => ApiSnafu {
                status: *status,
                message: "too many requests",
            }
            .fail(),
        }
    }
}

fn aapl(bars: Vec<Bar>) -> Vec<BarSeries> {
    vec![BarSeries {
        symbol: "AAPL".into(),
        timeframe: TimeFrame::day(),
        bars,
    }]
}

#[test]
fn five_ascending_bars_stay_five() {
    let series = HistoryNormalizer::default().normalize("AAPL", 30, five_bars());

    assert_eq!(series.len(), 5);
    assert!(series.bars().iter().all(|b| b.symbol == "AAPL"));
    assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn empty_input_is_empty_regardless_of_arguments() {
    for (symbol, days) in [("ZZZZ", 30), ("SPY", 900), ("X", 1)] {
        let series = HistoryNormalizer::default().normalize(symbol, days, Vec::<Bar>::new());
        assert!(series.is_empty());
    }
}

#[tokio::test]
async fn fetch_requests_daily_window_and_normalizes() {
    let provider = FakeProvider::with_series(aapl(five_bars()));
    let series = HistoryNormalizer::default()
        .fetch(&provider, " aapl ", 30, today())
        .await
        .unwrap();

    assert_eq!(series.symbol(), "AAPL");
    assert_eq!(series.len(), 5);

    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].symbols, vec!["AAPL".to_string()]);
    assert_eq!(seen[0].timeframe, TimeFrame::day());
    assert_eq!(seen[0].start.date_naive(), NaiveDate::from_ymd_opt(2024, 5, 29).unwrap());
    assert_eq!(seen[0].end.date_naive(), today());
}

#[tokio::test]
async fn bars_outside_the_window_are_ignored() {
    let mut bars = five_bars();
    bars.push(bar_on(today(), 200.0));
    let provider = FakeProvider::with_series(aapl(bars));

    let series = HistoryNormalizer::default()
        .fetch(&provider, "AAPL", 30, today())
        .await
        .unwrap();
    assert_eq!(series.len(), 5);
    assert!(series.last_date().unwrap() < today());
}

#[tokio::test]
async fn unknown_symbol_is_no_data() {
    let provider = FakeProvider::with_series(vec![]);
    let err = HistoryNormalizer::default()
        .fetch(&provider, "ZZZZ", 30, today())
        .await
        .unwrap_err();

    match err {
        HistoryError::NoData { symbol, start, end } => {
            assert_eq!(symbol, "ZZZZ");
            assert_eq!(end, today());
            assert!(start < end);
        }
        other => panic!("expected NoData, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_failure_is_distinct_from_no_data() {
    let provider = FakeProvider::failing(429);
    let err = HistoryNormalizer::default()
        .fetch(&provider, "AAPL", 30, today())
        .await
        .unwrap_err();

    assert!(matches!(err, HistoryError::Provider { ref symbol, .. } if symbol == "AAPL"));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn blank_symbol_never_reaches_the_provider() {
    let provider = FakeProvider::with_series(aapl(five_bars()));
    let err = HistoryNormalizer::default()
        .fetch(&provider, "  ", 30, today())
        .await
        .unwrap_err();

    assert!(matches!(err, HistoryError::EmptySymbol));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn lookback_outside_bounds_never_reaches_the_provider() {
    let provider = FakeProvider::with_series(aapl(five_bars()));
    let normalizer = HistoryNormalizer::new(LookbackBounds::new(10, 730));

    for days in [0, 9, 731] {
        let err = normalizer.fetch(&provider, "AAPL", days, today()).await.unwrap_err();
        assert!(matches!(
            err,
            HistoryError::LookbackOutOfRange { min: 10, max: 730, .. }
        ));
    }
    assert_eq!(provider.calls(), 0);
}

proptest! {
    #[test]
    fn normalize_preserves_count_order_and_symbol(
        gaps in proptest::collection::vec(1u64..5, 1..60),
        symbol in "[A-Z]{1,5}",
    ) {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut date = start;
        let mut rows = Vec::with_capacity(gaps.len());
        for (i, gap) in gaps.iter().enumerate() {
            date = date.checked_add_days(Days::new(*gap)).unwrap();
            rows.push(bar_on(date, 50.0 + i as f64));
        }

        let series = HistoryNormalizer::default().normalize(&symbol, 900, &rows);

        prop_assert_eq!(series.len(), rows.len());
        prop_assert!(series.bars().iter().all(|b| b.symbol == symbol));
        for (bar, row) in series.bars().iter().zip(&rows) {
            prop_assert_eq!(bar.date, row.trading_date);
            prop_assert_eq!(bar.open, row.open);
            prop_assert_eq!(bar.close, row.close);
        }
    }

    #[test]
    fn normalize_sorts_any_permutation_without_losing_rows(
        (rows, shuffled) in proptest::collection::vec(1u64..5, 1..40).prop_flat_map(|gaps| {
            let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
            let mut date = start;
            let rows: Vec<Bar> = gaps
                .iter()
                .enumerate()
                .map(|(i, gap)| {
                    date = date.checked_add_days(Days::new(*gap)).unwrap();
                    bar_on(date, 20.0 + i as f64)
                })
                .collect();
            (Just(rows.clone()), Just(rows).prop_shuffle())
        }),
    ) {
        let series = HistoryNormalizer::default().normalize("QQQ", 900, &shuffled);

        prop_assert_eq!(series.len(), rows.len());
        for (bar, row) in series.bars().iter().zip(&rows) {
            prop_assert_eq!(bar.date, row.trading_date);
            prop_assert_eq!(bar.open, row.open);
        }
    }
}
