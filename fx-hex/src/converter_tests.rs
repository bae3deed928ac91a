//! Converter unit tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use fx_types::{ConversionState, ConvertError, FetchError, RateError};

    use crate::converter::{Converter, parse_amount};
    use crate::policy::{PolicyConfig, RatePolicy};
    use crate::testing::{FakeConnectivity, FakeSource, ManualClock, START_MS, TestStore, code};

    struct Harness {
        converter: Converter<FakeConnectivity>,
        store: TestStore,
        source: FakeSource,
        connectivity: FakeConnectivity,
    }

    fn harness(connectivity: FakeConnectivity) -> Harness {
        let store = TestStore::new();
        let source = FakeSource::new();
        let policy = RatePolicy::spawn(
            store.clone(),
            source.clone(),
            ManualClock::at(START_MS),
            PolicyConfig::default(),
        );
        Harness {
            converter: Converter::new(policy, connectivity.clone()),
            store,
            source,
            connectivity,
        }
    }

    fn expect_success(state: ConversionState) -> fx_types::Conversion {
        match state {
            ConversionState::Success(conversion) => conversion,
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_converts_from_fresh_cache() {
        let h = harness(FakeConnectivity::online());
        h.store
            .seed("USD", &[("EUR", 0.92)], START_MS - 5 * 60 * 1000)
            .await;

        let conversion = expect_success(h.converter.submit("USD", "EUR", "100").await);

        assert_eq!(conversion.to_string(), "100.00 USD = 92.00 EUR");
        assert_eq!(h.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_converts_after_fetch_and_caches() {
        let h = harness(FakeConnectivity::online());
        h.source
            .respond("USD", &[("EUR", 0.9), ("GBP", 0.79), ("JPY", 150.0)]);

        let conversion = expect_success(h.converter.submit("USD", "EUR", "100").await);

        assert_eq!(conversion.to_string(), "100.00 USD = 90.00 EUR");
        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.store.writes(), 1);
        let rows = h.store.rows("USD").await;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.fetched_at == START_MS));
    }

    #[tokio::test]
    async fn test_invalid_amount_touches_nothing() {
        let h = harness(FakeConnectivity::online());

        let state = h.converter.submit("USD", "EUR", "abc").await;

        assert_eq!(state, ConversionState::Error(ConvertError::InvalidAmount));
        assert_eq!(state.to_string(), "invalid amount");
        assert_eq!(h.store.reads(), 0);
        assert_eq!(h.store.writes(), 0);
        assert_eq!(h.source.calls(), 0);
        assert_eq!(h.connectivity.checks(), 0);
    }

    #[tokio::test]
    async fn test_missing_target_is_unavailable() {
        let h = harness(FakeConnectivity::online());
        h.source.respond("USD", &[("EUR", 0.9)]);

        let state = h.converter.submit("USD", "XXX", "50").await;

        assert_eq!(
            state,
            ConversionState::Error(ConvertError::TargetUnavailable(code("XXX")))
        );
        assert_eq!(state.to_string(), "target currency not available");
        assert_eq!(h.store.writes(), 1);
    }

    #[tokio::test]
    async fn test_same_currency_skips_policy_even_offline() {
        let h = harness(FakeConnectivity::offline());

        let conversion = expect_success(h.converter.submit("eur", "EUR", "42.5").await);

        assert_eq!(conversion.rate, 1.0);
        assert_eq!(conversion.result, 42.5);
        assert_eq!(h.connectivity.checks(), 0);
        assert_eq!(h.store.reads(), 0);
        assert_eq!(h.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_offline_fails_before_policy() {
        let h = harness(FakeConnectivity::offline());
        h.store.seed("USD", &[("EUR", 0.92)], START_MS).await;

        let state = h.converter.submit("USD", "EUR", "100").await;

        assert_eq!(state, ConversionState::Error(ConvertError::NoConnectivity));
        assert_eq!(state.to_string(), "no connectivity");
        assert_eq!(h.store.reads(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_source_message() {
        let h = harness(FakeConnectivity::online());
        h.source
            .fail("USD", FetchError::Network("request timed out".into()));

        let state = h.converter.submit("USD", "EUR", "100").await;

        assert_eq!(
            state,
            ConversionState::Error(ConvertError::Rate(RateError::Fetch(FetchError::Network(
                "request timed out".into()
            ))))
        );
        assert_eq!(state.to_string(), "Network error: request timed out");
    }

    #[tokio::test]
    async fn test_overflowing_result_is_invalid_amount() {
        let h = harness(FakeConnectivity::online());
        h.source.respond("USD", &[("JPY", 150.0)]);

        let state = h.converter.submit("USD", "JPY", "1e308").await;

        assert_eq!(state, ConversionState::Error(ConvertError::InvalidAmount));
        assert!(h.converter.last_conversion().is_none());
    }

    #[tokio::test]
    async fn test_invalid_currency_code() {
        let h = harness(FakeConnectivity::online());

        let state = h.converter.submit("US", "EUR", "1").await;

        assert_eq!(
            state,
            ConversionState::Error(ConvertError::InvalidCurrency("US".into()))
        );
        assert_eq!(h.store.reads(), 0);
    }

    #[tokio::test]
    async fn test_state_stream_and_last_conversion() {
        let h = harness(FakeConnectivity::online());
        h.source.respond("USD", &[("EUR", 0.9)]);
        let updates = h.converter.subscribe();
        assert_eq!(*updates.borrow(), ConversionState::Idle);
        assert!(h.converter.last_conversion().is_none());

        h.converter.submit("USD", "EUR", "10").await;
        let saved = h.converter.last_conversion().unwrap();
        assert_eq!(saved.result, 9.0);
        assert_eq!(*updates.borrow(), ConversionState::Success(saved.clone()));

        // A failed submission keeps the last good conversion.
        h.converter.submit("USD", "EUR", "").await;
        assert_eq!(h.converter.last_conversion(), Some(saved));
        assert_eq!(
            h.converter.state(),
            ConversionState::Error(ConvertError::EmptyAmount)
        );
    }

    #[tokio::test]
    async fn test_loading_is_published_while_fetching() {
        let h = harness(FakeConnectivity::online());
        h.source.set_delay(Duration::from_millis(50));
        h.source.respond("USD", &[("EUR", 0.9)]);
        let Harness { converter, .. } = h;
        let converter = Arc::new(converter);
        let mut updates = converter.subscribe();

        let task = {
            let converter = converter.clone();
            tokio::spawn(async move { converter.submit("USD", "EUR", "1").await })
        };

        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow_and_update(), ConversionState::Loading);

        let finished = task.await.unwrap();
        assert!(finished.is_terminal());
        assert_eq!(*updates.borrow(), finished);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.5 "), Ok(12.5));
        assert_eq!(parse_amount(""), Err(ConvertError::EmptyAmount));
        assert_eq!(parse_amount("   "), Err(ConvertError::EmptyAmount));
        assert_eq!(parse_amount("1,000"), Err(ConvertError::InvalidAmount));
        assert_eq!(parse_amount("NaN"), Err(ConvertError::InvalidAmount));
        assert_eq!(parse_amount("inf"), Err(ConvertError::InvalidAmount));
        assert_eq!(parse_amount("0"), Err(ConvertError::NonPositiveAmount));
        assert_eq!(parse_amount("-3"), Err(ConvertError::NonPositiveAmount));
    }
}
