//! The full set of services.

use havenstats_core::ServiceKind;
use havenstats_fetch::{Clock, FetchError, HttpClient, ServiceInfo, StatsService};
use std::sync::Arc;

use crate::arkiv::{ArkivConfig, DataUsageService};
use crate::filecoin_pay::{FilecoinPayConfig, TokenLedgerService};
use crate::lit::{ExecutionMetricsService, LitConfig};

/// One instance of every service, shareable across pollers.
#[derive(Debug, Clone)]
pub struct ServiceSet {
    /// Arkiv data usage.
    pub usage: Arc<DataUsageService>,
    /// Lit execution metrics.
    pub metrics: Arc<ExecutionMetricsService>,
    /// Filecoin Pay token ledger.
    pub ledger: Arc<TokenLedgerService>,
}

impl ServiceSet {
    /// Builds every service with a shared clock and HTTP client.
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be built.
    pub fn with_parts(
        arkiv: ArkivConfig,
        lit: LitConfig,
        filecoin_pay: FilecoinPayConfig,
        clock: &Arc<dyn Clock>,
        http: &HttpClient,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            usage: Arc::new(
                DataUsageService::new(arkiv)?
                    .with_clock(Arc::clone(clock))
                    .with_http(http.clone()),
            ),
            metrics: Arc::new(
                ExecutionMetricsService::new(lit)?
                    .with_clock(Arc::clone(clock))
                    .with_http(http.clone()),
            ),
            ledger: Arc::new(
                TokenLedgerService::new(filecoin_pay)?
                    .with_clock(Arc::clone(clock))
                    .with_http(http.clone()),
            ),
        })
    }

    /// Summaries of every service, in display order.
    pub fn infos(&self) -> Vec<ServiceInfo> {
        vec![self.usage.info(), self.metrics.info(), self.ledger.info()]
    }

    /// Summary of one service.
    pub fn info(&self, kind: ServiceKind) -> ServiceInfo {
        match kind {
            ServiceKind::DataUsage => self.usage.info(),
            ServiceKind::ExecutionMetrics => self.metrics.info(),
            ServiceKind::TokenLedger => self.ledger.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let set = ServiceSet::with_parts(
            ArkivConfig::default(),
            LitConfig::default(),
            FilecoinPayConfig::default(),
            &havenstats_fetch::system_clock(),
            &HttpClient::new().unwrap(),
        )
        .unwrap();

        let infos = set.infos();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].kind, ServiceKind::DataUsage);
        assert!(infos[0].configured);
        assert!(!set.info(ServiceKind::ExecutionMetrics).configured);
        assert_eq!(infos[2].id, "filecoin_pay.ledger");
    }
}
