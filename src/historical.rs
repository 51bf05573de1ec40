use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument};

use crate::client::{Params, RestClient};
use crate::errors::{NtopngError, Result};
use crate::types::AlertFamily;

const REST_V2_URL: &str = "/lua/rest/v2";
const REST_PRO_V2_URL: &str = "/lua/pro/rest/v2";

/// Access to historical ntopng data: alerts, flows, and timeseries
///
/// `Historical` borrows an externally managed [`RestClient`] and translates
/// each query into exactly one REST v2 endpoint invocation. It holds no
/// state beyond the two base paths, performs no argument validation, and
/// surfaces transport failures unchanged. Flow queries require a Pro
/// license on the ntopng side.
///
/// # Example
///
/// ```rust,no_run
/// use ntopng_historical_api::{Historical, NtopngClient};
/// use url::Url;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = NtopngClient::new(
///         Url::parse("http://localhost:3000")?,
///         Duration::from_secs(10),
///     )?;
///
///     let historical = Historical::new(&client);
///     let counters = historical
///         .get_alert_type_counters(0, 1700000000, 1700003600)
///         .await?;
///     println!("{counters}");
///     Ok(())
/// }
/// ```
pub struct Historical<'a, C> {
    client: &'a C,
    rest_v2_url: &'static str,
    rest_pro_v2_url: &'static str,
}

impl<'a, C: RestClient> Historical<'a, C> {
    /// Create a new `Historical` facade over an existing client
    ///
    /// The client is borrowed; its lifetime stays with the caller.
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            rest_v2_url: REST_V2_URL,
            rest_pro_v2_url: REST_PRO_V2_URL,
        }
    }

    /// Return the number of historical alerts per alert type
    pub async fn get_alert_type_counters(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
    ) -> Result<Value> {
        let path = format!("{}/get/alert/type/counters.lua", self.rest_v2_url);
        self.client
            .request(&path, Some(counter_params(ifid, epoch_begin, epoch_end)))
            .await
    }

    /// Return the number of historical alerts per alert severity
    pub async fn get_alert_severity_counters(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
    ) -> Result<Value> {
        let path = format!("{}/get/alert/severity/counters.lua", self.rest_v2_url);
        self.client
            .request(&path, Some(counter_params(ifid, epoch_begin, epoch_end)))
            .await
    }

    /// Run a query on the alert database
    ///
    /// `select_clause`, `where_clause`, `group_by` and `order_by` are SQL
    /// fragments passed to the server verbatim. No escaping or validation
    /// happens on this side; keeping the fragments well formed (and safe)
    /// is the caller's responsibility.
    ///
    /// # Arguments
    ///
    /// * `alert_family` - The alert subsystem to query
    /// * `ifid` - The interface ID
    /// * `epoch_begin` - Start of the time interval (epoch seconds)
    /// * `epoch_end` - End of the time interval (epoch seconds)
    /// * `select_clause` - Select clause (SQL syntax)
    /// * `where_clause` - Optional where clause (SQL syntax)
    /// * `maxhits` - Max number of results (limit)
    /// * `group_by` - Optional group by condition (SQL syntax)
    /// * `order_by` - Optional order by condition (SQL syntax)
    #[allow(clippy::too_many_arguments)]
    pub async fn get_alerts(
        &self,
        alert_family: AlertFamily,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        let mut params = Params::new();
        params.insert("ifid".into(), ifid.into());
        params.insert("alert_family".into(), alert_family.as_str().into());
        params.insert("epoch_begin".into(), epoch_begin.into());
        params.insert("epoch_end".into(), epoch_end.into());
        params.insert("select_clause".into(), select_clause.into());
        params.insert("where_clause".into(), opt(where_clause));
        params.insert("maxhits_clause".into(), maxhits.into());
        params.insert("group_by_clause".into(), opt(group_by));
        params.insert("order_by_clause".into(), opt(order_by));

        let path = format!("{}/get/alert/list/alerts.lua", self.rest_v2_url);
        self.client.request(&path, Some(params)).await
    }

    /// Return flow alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_flow_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::Flow,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return active monitoring alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_active_monitoring_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::ActiveMonitoring,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return host alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_host_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::Host,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return interface alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_interface_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::Interface,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return MAC alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_mac_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::Mac,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return network alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_network_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::Network,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return SNMP alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_snmp_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::Snmp,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return system alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_system_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::System,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return user alerts matching the specified criteria
    #[allow(clippy::too_many_arguments)]
    pub async fn get_user_alerts(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        self.get_alerts(
            AlertFamily::User,
            ifid,
            epoch_begin,
            epoch_end,
            select_clause,
            where_clause,
            maxhits,
            group_by,
            order_by,
        )
        .await
    }

    /// Return timeseries data for a schema and query
    ///
    /// `ts_query` is a flat selector string the server parses itself, e.g.
    /// `"ifid:0,host:10.0.0.1"`. See [`get_host_timeseries`] and
    /// [`get_interface_timeseries`] for the common forms.
    ///
    /// [`get_host_timeseries`]: Historical::get_host_timeseries
    /// [`get_interface_timeseries`]: Historical::get_interface_timeseries
    pub async fn get_timeseries(
        &self,
        ts_schema: &str,
        ts_query: &str,
        epoch_begin: i64,
        epoch_end: i64,
    ) -> Result<Value> {
        let mut params = Params::new();
        params.insert("ts_schema".into(), ts_schema.into());
        params.insert("ts_query".into(), ts_query.into());
        params.insert("epoch_begin".into(), epoch_begin.into());
        params.insert("epoch_end".into(), epoch_end.into());

        let path = format!("{}/get/timeseries/ts.lua", self.rest_v2_url);
        self.client.post_request(&path, Some(params)).await
    }

    /// Return timeseries metadata (list all available timeseries)
    pub async fn get_timeseries_metadata(&self) -> Result<Value> {
        let path = format!("{}/get/timeseries/type/consts.lua", self.rest_v2_url);
        self.client.request(&path, None).await
    }

    /// Return timeseries data for a host on an interface
    pub async fn get_host_timeseries(
        &self,
        ifid: u32,
        host_ip: &str,
        ts_schema: &str,
        epoch_begin: i64,
        epoch_end: i64,
    ) -> Result<Value> {
        self.get_timeseries(
            ts_schema,
            &format!("ifid:{ifid},host:{host_ip}"),
            epoch_begin,
            epoch_end,
        )
        .await
    }

    /// Return timeseries data for an interface
    pub async fn get_interface_timeseries(
        &self,
        ifid: u32,
        ts_schema: &str,
        epoch_begin: i64,
        epoch_end: i64,
    ) -> Result<Value> {
        self.get_timeseries(ts_schema, &format!("ifid:{ifid}"), epoch_begin, epoch_end)
            .await
    }

    /// Run a query on the historical flows database (ClickHouse, Pro only)
    ///
    /// As with [`get_alerts`](Historical::get_alerts), the SQL fragments are
    /// forwarded verbatim and never sanitized here. Note the wire parameter
    /// names: the limit travels as `maxhits_clause`.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_flows(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        select_clause: &str,
        where_clause: Option<&str>,
        maxhits: u32,
        group_by: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Value> {
        let mut params = Params::new();
        params.insert("ifid".into(), ifid.into());
        params.insert("epoch_begin".into(), epoch_begin.into());
        params.insert("epoch_end".into(), epoch_end.into());
        params.insert("select_clause".into(), select_clause.into());
        params.insert("where_clause".into(), opt(where_clause));
        params.insert("maxhits_clause".into(), maxhits.into());
        params.insert("group_by_clause".into(), opt(group_by));
        params.insert("order_by_clause".into(), opt(order_by));

        let path = format!("{}/get/db/flows.lua", self.rest_pro_v2_url);
        self.client.post_request(&path, Some(params)).await
    }

    /// Retrieve the Top-K flows from the historical flows database (Pro only)
    ///
    /// This endpoint names its time window `begin_time_clause` and
    /// `end_time_clause` instead of `epoch_begin`/`epoch_end`. The
    /// inconsistency is fixed by the server and preserved here.
    pub async fn get_topk_flows(
        &self,
        ifid: u32,
        epoch_begin: i64,
        epoch_end: i64,
        max_hits: u32,
        where_clause: Option<&str>,
    ) -> Result<Value> {
        let mut params = Params::new();
        params.insert("ifid".into(), ifid.into());
        params.insert("begin_time_clause".into(), epoch_begin.into());
        params.insert("end_time_clause".into(), epoch_end.into());
        params.insert("maxhits_clause".into(), max_hits.into());
        params.insert("where_clause".into(), opt(where_clause));

        let path = format!("{}/get/db/topk_flows.lua", self.rest_pro_v2_url);
        self.client.request(&path, Some(params)).await
    }

    /// Manual smoke test: exercise every query against a live server
    ///
    /// Queries the last hour of data for `ifid` and `host` and logs each
    /// response. The first failing operation aborts the run; its error is
    /// wrapped in [`NtopngError::SelfTest`] with the cause preserved.
    #[instrument(name = "Historical::self_test", skip(self))]
    pub async fn self_test(&self, ifid: u32, host: &str) -> Result<()> {
        let epoch_end = Utc::now().timestamp();
        let epoch_begin = epoch_end - 3600;

        let run = async {
            for family in AlertFamily::all() {
                let alerts = self
                    .get_alerts(
                        family,
                        ifid,
                        epoch_begin,
                        epoch_end,
                        "*",
                        None,
                        5,
                        None,
                        Some("epoch_begin"),
                    )
                    .await?;
                info!(%family, "alerts: {alerts}");
            }

            let by_type = self
                .get_alert_type_counters(ifid, epoch_begin, epoch_end)
                .await?;
            info!("alert counters by type: {by_type}");

            let by_severity = self
                .get_alert_severity_counters(ifid, epoch_begin, epoch_end)
                .await?;
            info!("alert counters by severity: {by_severity}");

            let host_traffic = self
                .get_host_timeseries(ifid, host, "host:traffic", epoch_begin, epoch_end)
                .await?;
            info!("host traffic timeseries: {host_traffic}");

            let iface_score = self
                .get_interface_timeseries(ifid, "iface:score", epoch_begin, epoch_end)
                .await?;
            info!("interface score timeseries: {iface_score}");

            let metadata = self.get_timeseries_metadata().await?;
            info!("timeseries metadata: {metadata}");

            let select_clause =
                "IPV4_SRC_ADDR,IPV4_DST_ADDR,PROTOCOL,IP_SRC_PORT,IP_DST_PORT,L7_PROTO,L7_PROTO_MASTER";
            let where_clause =
                format!("(IP_PROTOCOL_VERSION=4) AND IPV4_SRC_ADDR=(\"{host}\") AND (PROTOCOL=6)");
            let flows = self
                .get_flows(
                    ifid,
                    epoch_begin,
                    epoch_end,
                    select_clause,
                    Some(&where_clause),
                    10,
                    None,
                    None,
                )
                .await?;
            info!("host flows: {flows}");

            let topk = self
                .get_topk_flows(ifid, epoch_begin, epoch_end, 10, None)
                .await?;
            info!("top-k flows: {topk}");

            Ok(())
        };

        run.await
            .map_err(|e| NtopngError::SelfTest(Box::new(e)))
    }
}

fn counter_params(ifid: u32, epoch_begin: i64, epoch_end: i64) -> Params {
    let mut params = Params::new();
    params.insert("ifid".into(), ifid.into());
    params.insert("status".into(), "historical".into());
    params.insert("epoch_begin".into(), epoch_begin.into());
    params.insert("epoch_end".into(), epoch_end.into());
    params
}

fn opt(clause: Option<&str>) -> Value {
    clause.map(Value::from).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as StdError;
    use std::future::Future;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        verb: &'static str,
        path: String,
        params: Option<Params>,
    }

    #[derive(Default)]
    struct MockClient {
        calls: Mutex<Vec<Call>>,
        fail: bool,
    }

    impl MockClient {
        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn last_call(&self) -> Call {
            self.calls
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no call recorded")
        }

        fn record(&self, verb: &'static str, path: &str, params: Option<Params>) -> Result<Value> {
            self.calls.lock().unwrap().push(Call {
                verb,
                path: path.to_string(),
                params,
            });

            if self.fail {
                Err(NtopngError::Api {
                    status: 400,
                    message: "Bad request".to_string(),
                })
            } else {
                Ok(json!({"rc": 0}))
            }
        }
    }

    impl RestClient for MockClient {
        fn request(
            &self,
            path: &str,
            params: Option<Params>,
        ) -> impl Future<Output = Result<Value>> + Send {
            let result = self.record("GET", path, params);
            async move { result }
        }

        fn post_request(
            &self,
            path: &str,
            params: Option<Params>,
        ) -> impl Future<Output = Result<Value>> + Send {
            let result = self.record("POST", path, params);
            async move { result }
        }
    }

    fn expected(value: Value) -> Option<Params> {
        Some(value.as_object().expect("object literal").clone())
    }

    async fn call_family_wrapper(
        historical: &Historical<'_, MockClient>,
        family: AlertFamily,
    ) -> Result<Value> {
        let (ifid, begin, end) = (0, 1000, 2000);
        match family {
            AlertFamily::Flow => {
                historical
                    .get_flow_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::ActiveMonitoring => {
                historical
                    .get_active_monitoring_alerts(
                        ifid,
                        begin,
                        end,
                        "*",
                        None,
                        5,
                        None,
                        Some("epoch_begin"),
                    )
                    .await
            }
            AlertFamily::Host => {
                historical
                    .get_host_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::Interface => {
                historical
                    .get_interface_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::Mac => {
                historical
                    .get_mac_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::Network => {
                historical
                    .get_network_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::Snmp => {
                historical
                    .get_snmp_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::System => {
                historical
                    .get_system_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
            AlertFamily::User => {
                historical
                    .get_user_alerts(ifid, begin, end, "*", None, 5, None, Some("epoch_begin"))
                    .await
            }
        }
    }

    #[tokio::test]
    async fn test_alert_type_counters_fixed_status() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_alert_type_counters(2, 1000, 2000)
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "GET");
        assert_eq!(call.path, "/lua/rest/v2/get/alert/type/counters.lua");
        assert_eq!(
            call.params,
            expected(json!({
                "ifid": 2,
                "status": "historical",
                "epoch_begin": 1000,
                "epoch_end": 2000,
            }))
        );
    }

    #[tokio::test]
    async fn test_alert_severity_counters_fixed_status() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_alert_severity_counters(0, 1000, 2000)
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "GET");
        assert_eq!(call.path, "/lua/rest/v2/get/alert/severity/counters.lua");
        assert_eq!(
            call.params.unwrap()["status"],
            Value::from("historical")
        );
    }

    #[tokio::test]
    async fn test_get_alerts_params_and_routing() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_alerts(
                AlertFamily::Host,
                0,
                1000,
                2000,
                "*",
                None,
                5,
                None,
                Some("epoch_begin"),
            )
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "GET");
        assert_eq!(call.path, "/lua/rest/v2/get/alert/list/alerts.lua");
        assert_eq!(
            call.params,
            expected(json!({
                "ifid": 0,
                "alert_family": "host",
                "epoch_begin": 1000,
                "epoch_end": 2000,
                "select_clause": "*",
                "where_clause": null,
                "maxhits_clause": 5,
                "group_by_clause": null,
                "order_by_clause": "epoch_begin",
            }))
        );
    }

    #[tokio::test]
    async fn test_family_wrappers_match_generic_query() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        for family in AlertFamily::all() {
            call_family_wrapper(&historical, family).await.unwrap();
            let wrapper_call = client.last_call();

            historical
                .get_alerts(family, 0, 1000, 2000, "*", None, 5, None, Some("epoch_begin"))
                .await
                .unwrap();
            let generic_call = client.last_call();

            assert_eq!(wrapper_call, generic_call, "family {family} diverged");
            assert_eq!(
                wrapper_call.params.as_ref().unwrap()["alert_family"],
                Value::from(family.as_str())
            );
        }
    }

    #[tokio::test]
    async fn test_timeseries_posts_params() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_timeseries("iface:traffic", "ifid:1", 1000, 2000)
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "POST");
        assert_eq!(call.path, "/lua/rest/v2/get/timeseries/ts.lua");
        assert_eq!(
            call.params,
            expected(json!({
                "ts_schema": "iface:traffic",
                "ts_query": "ifid:1",
                "epoch_begin": 1000,
                "epoch_end": 2000,
            }))
        );
    }

    #[tokio::test]
    async fn test_host_timeseries_query_format() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_host_timeseries(0, "10.0.0.1", "host:traffic", 1000, 2000)
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "POST");
        assert_eq!(
            call.params.unwrap()["ts_query"],
            Value::from("ifid:0,host:10.0.0.1")
        );
    }

    #[tokio::test]
    async fn test_interface_timeseries_query_format() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_interface_timeseries(3, "iface:score", 1000, 2000)
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.params.unwrap()["ts_query"], Value::from("ifid:3"));
    }

    #[tokio::test]
    async fn test_timeseries_metadata_has_no_params() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical.get_timeseries_metadata().await.unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "GET");
        assert_eq!(call.path, "/lua/rest/v2/get/timeseries/type/consts.lua");
        assert_eq!(call.params, None);
    }

    #[tokio::test]
    async fn test_flows_posts_to_pro_path() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_flows(
                0,
                1000,
                2000,
                "IPV4_SRC_ADDR,IPV4_DST_ADDR",
                Some("PROTOCOL=6"),
                10,
                None,
                None,
            )
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "POST");
        assert_eq!(call.path, "/lua/pro/rest/v2/get/db/flows.lua");
        assert_eq!(
            call.params,
            expected(json!({
                "ifid": 0,
                "epoch_begin": 1000,
                "epoch_end": 2000,
                "select_clause": "IPV4_SRC_ADDR,IPV4_DST_ADDR",
                "where_clause": "PROTOCOL=6",
                "maxhits_clause": 10,
                "group_by_clause": null,
                "order_by_clause": null,
            }))
        );
    }

    #[tokio::test]
    async fn test_topk_flows_wire_names() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_topk_flows(1, 1000, 2000, 10, None)
            .await
            .unwrap();

        let call = client.last_call();
        assert_eq!(call.verb, "GET");
        assert_eq!(call.path, "/lua/pro/rest/v2/get/db/topk_flows.lua");

        let params = call.params.unwrap();
        assert_eq!(params["begin_time_clause"], Value::from(1000));
        assert_eq!(params["end_time_clause"], Value::from(2000));
        assert_eq!(params["maxhits_clause"], Value::from(10));
        assert_eq!(params["where_clause"], Value::Null);
        assert!(!params.contains_key("epoch_begin"));
        assert!(!params.contains_key("epoch_end"));
    }

    #[tokio::test]
    async fn test_absent_clauses_forwarded_as_null() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical
            .get_alerts(AlertFamily::Flow, 0, 1000, 2000, "*", None, 5, None, None)
            .await
            .unwrap();

        let params = client.last_call().params.unwrap();
        assert_eq!(params["where_clause"], Value::Null);
        assert_eq!(params["group_by_clause"], Value::Null);
        assert_eq!(params["order_by_clause"], Value::Null);
    }

    #[tokio::test]
    async fn test_self_test_wraps_error_with_cause() {
        let client = MockClient::failing();
        let historical = Historical::new(&client);

        let err = historical.self_test(0, "10.0.0.1").await.unwrap_err();

        assert!(matches!(err, NtopngError::SelfTest(_)));
        let source = StdError::source(&err).expect("cause must be preserved");
        assert!(source.to_string().contains("HTTP 400"));
    }

    #[tokio::test]
    async fn test_self_test_runs_every_operation() {
        let client = MockClient::default();
        let historical = Historical::new(&client);

        historical.self_test(0, "10.0.0.1").await.unwrap();

        let calls = client.calls.lock().unwrap();
        // 9 families + 2 counters + 2 timeseries + metadata + flows + topk
        assert_eq!(calls.len(), 16);

        let posts = calls.iter().filter(|c| c.verb == "POST").count();
        // 2 timeseries queries + 1 flows query
        assert_eq!(posts, 3);
    }
}
