use std::time::Duration;
use storebench_engine::counters::WindowCounts;
use storebench_engine::metrics::Metric;
use storebench_engine::{
    LatencyReport, MetricReport, Report, ReportSink, ThroughputReport, VecSink,
};

#[test]
fn test_throughput_report_math() {
    let window = WindowCounts {
        operations: 500,
        latency_us: 1_000_000,
        errors: 2,
    };
    let r = ThroughputReport::from_window("Redis", Duration::from_millis(2000), window, false);
    assert_eq!(r.workload, "Redis");
    assert_eq!(r.elapsed_ms, 2000);
    assert_eq!(r.operations, 500);
    assert_eq!(r.errors, 2);
    assert_eq!(r.throughput, 250.0);
    assert_eq!(r.operation_latency, 2.0);
}

#[test]
fn test_zero_operation_summary_uses_nan_latency() {
    let r = ThroughputReport::from_window("w", Duration::ZERO, WindowCounts::default(), true);
    assert_eq!(r.throughput, 0.0);
    assert!(r.operation_latency.is_nan());

    let json: serde_json::Value = serde_json::from_str(&Report::Throughput(r).to_json()).unwrap();
    assert!(json["operation_latency"].is_null());
}

#[test]
fn test_report_json_is_tagged_by_type() {
    let mut m = Metric::new("latency");
    m.add_sample(1.0).add_sample(2.0);
    let report = Report::Latency(LatencyReport {
        workload: "Sql".to_string(),
        elapsed_ms: 10,
        operations: 2,
        errors: 0,
        latency: m.summary().unwrap(),
        score: Some(1.0),
    });

    let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
    assert_eq!(json["type"], "latency");
    assert_eq!(json["workload"], "Sql");
    assert_eq!(json["latency"]["p99"], 2.0);
    assert_eq!(json["latency"]["p9999"], 2.0);

    let window = WindowCounts {
        operations: 1,
        latency_us: 1000,
        errors: 0,
    };
    let t = Report::Throughput(ThroughputReport::from_window(
        "Sql",
        Duration::from_secs(1),
        window,
        false,
    ));
    let json: serde_json::Value = serde_json::from_str(&t.to_json()).unwrap();
    assert_eq!(json["type"], "throughput");
    assert_eq!(json["throughput"], 1.0);
    assert_eq!(json["operation_latency"], 1.0);
}

#[test]
fn test_vec_sink_keeps_order_and_filters_windows() {
    let sink = VecSink::new();
    let window = WindowCounts {
        operations: 1,
        latency_us: 0,
        errors: 0,
    };
    let second = Duration::from_secs(1);
    sink.emit(&Report::Throughput(ThroughputReport::from_window("a", second, window, false)));
    sink.emit(&Report::Throughput(ThroughputReport::from_window("b", second, window, true)));

    let mut m = Metric::new("score");
    m.add_sample(0.5);
    sink.emit(&Report::Metric(MetricReport {
        workload: "c".to_string(),
        metric: "score".to_string(),
        stats: m.summary().unwrap(),
    }));

    assert_eq!(sink.reports().len(), 3);
    assert_eq!(sink.metric_reports().len(), 1);
    assert_eq!(sink.metric_reports()[0].workload, "c");
    let windows = sink.throughput_windows();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].workload, "a");
}

#[test]
fn test_metric_report_json() {
    let mut m = Metric::new("latency");
    m.add_sample(3.0).add_sample(1.0).add_sample(2.0);
    let report = Report::Metric(MetricReport {
        workload: "Redis".to_string(),
        metric: "latency".to_string(),
        stats: m.summary().unwrap(),
    });

    let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
    assert_eq!(json["type"], "metric");
    assert_eq!(json["metric"], "latency");
    assert_eq!(json["stats"]["count"], 3);
    assert_eq!(json["stats"]["median"], 2.0);
}
