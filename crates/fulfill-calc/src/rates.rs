//! 運費探測
//!
//! 對外部費率聚合服務的薄封裝：詢價結果排序、最低計費重量、
//! 以及路線承重上限的階梯式探測。

use rust_decimal::Decimal;

use fulfill_core::{OptimizerConfig, RateQuote, RateSource};

/// 運費探測器
pub struct RateProber<'a> {
    source: &'a dyn RateSource,
    config: &'a OptimizerConfig,
}

impl<'a> RateProber<'a> {
    pub fn new(source: &'a dyn RateSource, config: &'a OptimizerConfig) -> Self {
        Self { source, config }
    }

    /// 最佳努力取得權杖；失敗不中止探測
    pub fn prepare(&self) {
        if let Err(error) = self.source.acquire_token() {
            tracing::debug!(%error, "取得費率權杖失敗，繼續探測");
        }
    }

    /// 詢價：回傳依運費由低到高排序的貨運選項
    ///
    /// 重量低於最低計費重量時以最低計費重量詢價。
    /// 來源錯誤向上傳遞，由呼叫端降級為單一候選不可用。
    pub fn probe(
        &self,
        pickup_postcode: &str,
        delivery_postcode: &str,
        weight_kgs: Decimal,
        cash_on_delivery: bool,
    ) -> fulfill_core::Result<Vec<RateQuote>> {
        let billable = weight_kgs.max(self.config.min_billable_weight_kgs);
        let mut quotes = self.source.available_options(
            pickup_postcode,
            delivery_postcode,
            billable,
            cash_on_delivery,
        )?;
        quotes.sort_by(|a, b| a.rate.cmp(&b.rate).then(a.courier.cmp(&b.courier)));
        Ok(quotes)
    }

    /// 路線承重上限：沿階梯由大到小探測，回傳首個有報價的重量
    ///
    /// 單階錯誤視同無報價，繼續下一階；全數落空回傳零
    /// （路線不可服務）。
    pub fn max_route_weight(
        &self,
        pickup_postcode: &str,
        delivery_postcode: &str,
        cash_on_delivery: bool,
    ) -> Decimal {
        for &weight in &self.config.weight_ladder_kgs {
            match self.source.available_options(
                pickup_postcode,
                delivery_postcode,
                weight,
                cash_on_delivery,
            ) {
                Ok(quotes) if !quotes.is_empty() => return weight,
                Ok(_) => {}
                Err(error) => {
                    tracing::debug!(%weight, %error, "承重探測失敗，嘗試下一階");
                }
            }
        }
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fulfill_core::FulfillError;
    use std::cell::RefCell;

    /// 依重量上限回覆報價的測試來源
    struct ThresholdSource {
        max_weight: Decimal,
        token_fails: bool,
        calls: RefCell<Vec<Decimal>>,
    }

    impl ThresholdSource {
        fn new(max_weight: i64) -> Self {
            Self {
                max_weight: Decimal::from(max_weight),
                token_fails: false,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RateSource for ThresholdSource {
        fn acquire_token(&self) -> fulfill_core::Result<()> {
            if self.token_fails {
                return Err(FulfillError::RateSource("auth failed".to_string()));
            }
            Ok(())
        }

        fn available_options(
            &self,
            _pickup: &str,
            _delivery: &str,
            weight_kgs: Decimal,
            _cod: bool,
        ) -> fulfill_core::Result<Vec<RateQuote>> {
            self.calls.borrow_mut().push(weight_kgs);
            if weight_kgs <= self.max_weight {
                Ok(vec![
                    RateQuote::new("Speedy", Decimal::from(30)),
                    RateQuote::new("Budget", Decimal::from(10)),
                ])
            } else {
                Ok(Vec::new())
            }
        }
    }

    struct FailingSource;

    impl RateSource for FailingSource {
        fn acquire_token(&self) -> fulfill_core::Result<()> {
            Err(FulfillError::RateSource("auth down".to_string()))
        }

        fn available_options(
            &self,
            _pickup: &str,
            _delivery: &str,
            _weight_kgs: Decimal,
            _cod: bool,
        ) -> fulfill_core::Result<Vec<RateQuote>> {
            Err(FulfillError::RateSource("service down".to_string()))
        }
    }

    #[test]
    fn test_probe_sorts_by_rate() {
        let source = ThresholdSource::new(500);
        let config = OptimizerConfig::default();
        let prober = RateProber::new(&source, &config);

        let quotes = prober.probe("110001", "560001", Decimal::from(10), false).unwrap();
        assert_eq!(quotes[0].courier, "Budget");
        assert_eq!(quotes[1].courier, "Speedy");
    }

    #[test]
    fn test_probe_clamps_to_min_billable_weight() {
        let source = ThresholdSource::new(500);
        let config = OptimizerConfig::default();
        let prober = RateProber::new(&source, &config);

        prober
            .probe("110001", "560001", Decimal::new(1, 1), false)
            .unwrap();
        assert_eq!(source.calls.borrow()[0], Decimal::new(5, 1));
    }

    #[test]
    fn test_max_route_weight_first_rung_with_quotes() {
        // 只有 ≤300 公斤有報價：應探測 500、400、300 後停住
        let source = ThresholdSource::new(300);
        let config = OptimizerConfig::default();
        let prober = RateProber::new(&source, &config);

        let max = prober.max_route_weight("110001", "560001", false);
        assert_eq!(max, Decimal::from(300));
        assert_eq!(
            *source.calls.borrow(),
            vec![Decimal::from(500), Decimal::from(400), Decimal::from(300)]
        );
    }

    #[test]
    fn test_max_route_weight_unserviceable_route() {
        let source = ThresholdSource::new(0);
        let config = OptimizerConfig::default();
        let prober = RateProber::new(&source, &config);

        assert_eq!(
            prober.max_route_weight("110001", "560001", false),
            Decimal::ZERO
        );
        assert_eq!(source.calls.borrow().len(), 5);
    }

    #[test]
    fn test_max_route_weight_errors_do_not_abort() {
        let config = OptimizerConfig::default();
        let prober = RateProber::new(&FailingSource, &config);
        assert_eq!(
            prober.max_route_weight("110001", "560001", false),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_prepare_swallows_token_failure() {
        let config = OptimizerConfig::default();
        let prober = RateProber::new(&FailingSource, &config);
        // 不應 panic，也不回傳錯誤
        prober.prepare();
    }
}
