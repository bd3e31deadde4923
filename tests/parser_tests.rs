use caps_nego_trace::parser::gst_log::{parse_gst_log, parse_structure};
use caps_nego_trace::parser::json_lines::parse_json_lines;
use caps_nego_trace::parser::{parse_events, read_events, Caps, InputFormat, QueryType, TraceEvent};
use std::io::Write;
use tempfile::NamedTempFile;

const JSONL: &str = r#"# two nested queries on thread 1
{"phase":"begin","thread":1,"ts":0,"query":"caps","pad":"src","peer":"sink","filter":"video/x-raw"}
{"phase":"begin","thread":1,"ts":1,"query":"accept-caps","pad":"sink","peer":"src","filter":"video/x-raw, format=I420"}
{"phase":"end","thread":1,"ts":2,"query":"accept-caps","pad":"sink","peer":"src","success":true,"accepted":true}
{"phase":"end","thread":1,"ts":3,"query":"caps","pad":"src","peer":"sink","success":true,"caps":"video/x-raw, format=I420"}
"#;

fn gst_line(ts: u64, name: &str, inner: &str, res: Option<bool>) -> String {
    let res = match res {
        Some(r) => format!(", res=(boolean){}", if r { 1 } else { 0 }),
        None => String::new(),
    };
    format!(
        "0:00:00.{ts:09} 4242 0x1e3c0a0 TRACE GST_TRACER :0:: query, thread-id=(guint64)77, ts=(guint64){ts}, pad-ix=(uint)3, elem-ix=(uint)1, peer-pad-ix=(uint)4, peer-elem-ix=(uint)2, name=(string){name}, structure=(structure)\"{inner}\"{res};"
    )
}

#[test]
fn test_json_lines_round_trip_events() {
    let events = parse_json_lines(JSONL, false).unwrap();
    assert_eq!(events.len(), 4);

    match &events[3] {
        TraceEvent::End(end) => {
            assert_eq!(end.query, QueryType::Caps);
            assert_eq!(end.caps, Some(Caps::new("video/x-raw, format=I420")));
        }
        TraceEvent::Begin(_) => panic!("expected end"),
    }
}

#[test]
fn test_unknown_query_names_parse_as_other() {
    let line = r#"{"phase":"begin","thread":1,"ts":0,"query":"allocation","pad":"src"}"#;
    let events = parse_json_lines(line, false).unwrap();
    assert_eq!(events[0].query(), QueryType::Other);
}

#[test]
fn test_gst_log_caps_then_accept_caps() {
    let log = [
        "0:00:00.000000001 4242 0x1e3c0a0 INFO GST_INIT gst.c:1:init: starting".to_string(),
        gst_line(
            10,
            "caps",
            r"query-caps\,\ filter\=\(GstCaps\)NULL\,\ caps\=\(GstCaps\)NULL\;",
            None,
        ),
        gst_line(
            11,
            "accept-caps",
            r"query-accept-caps\,\ caps\=\(GstCaps\)audio/x-raw\,\ result\=\(boolean\)false\;",
            None,
        ),
        gst_line(
            12,
            "accept-caps",
            r"query-accept-caps\,\ caps\=\(GstCaps\)audio/x-raw\,\ result\=\(boolean\)true\;",
            Some(true),
        ),
        gst_line(
            13,
            "caps",
            r"query-caps\,\ filter\=\(GstCaps\)NULL\,\ caps\=\(GstCaps\)audio/x-raw\;",
            Some(true),
        ),
    ]
    .join("\n");

    let events = parse_gst_log(&log, false).unwrap();
    assert_eq!(events.len(), 4);

    match &events[1] {
        TraceEvent::Begin(begin) => {
            assert_eq!(begin.query, QueryType::AcceptCaps);
            assert_eq!(begin.filter, Some(Caps::new("audio/x-raw")));
        }
        TraceEvent::End(_) => panic!("expected begin"),
    }

    match &events[2] {
        TraceEvent::End(end) => assert_eq!(end.accepted, Some(true)),
        TraceEvent::Begin(_) => panic!("expected end"),
    }

    match &events[3] {
        TraceEvent::End(end) => {
            assert!(end.success);
            assert_eq!(end.caps, Some(Caps::new("audio/x-raw")));
            assert_eq!(end.endpoint.as_str(), "elem1");
        }
        TraceEvent::Begin(_) => panic!("expected end"),
    }
}

#[test]
fn test_parse_structure_strips_types() {
    let s = parse_structure("query-caps, filter=(GstCaps)NULL, caps=(GstCaps)ANY;").unwrap();
    assert_eq!(s.name, "query-caps");
    assert_eq!(s.get_caps("filter"), None);
    assert_eq!(s.get_caps("caps"), Some(Caps::new("ANY")));
}

#[test]
fn test_parse_events_detects_format() {
    let events = parse_events(JSONL, None, false).unwrap();
    assert_eq!(events.len(), 4);

    let gst = gst_line(
        1,
        "caps",
        r"query-caps\,\ filter\=\(GstCaps\)NULL\,\ caps\=\(GstCaps\)NULL\;",
        None,
    );
    let events = parse_events(&gst, None, false).unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn test_read_events_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(JSONL.as_bytes()).unwrap();

    let events = read_events(file.path(), Some(InputFormat::JsonLines), false).unwrap();
    assert_eq!(events.len(), 4);
}

#[test]
fn test_read_events_missing_file() {
    assert!(read_events("/nonexistent/trace.jsonl", None, true).is_err());
}

#[test]
fn test_pad_without_element_skips_whole_query() {
    let inner = r"query-caps\,\ filter\=\(GstCaps\)NULL\,\ caps\=\(GstCaps\)NULL\;";
    let unowned = |line: String| line.replace(" elem-ix=(uint)1,", " elem-ix=(uint)4294967295,");
    let log = [
        gst_line(1, "caps", inner, None),
        unowned(gst_line(2, "caps", inner, None)),
        unowned(gst_line(3, "caps", inner, Some(true))),
        gst_line(4, "caps", inner, Some(true)),
    ]
    .join("\n");

    let events = parse_gst_log(&log, false).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| match e {
        TraceEvent::Begin(b) => b.endpoint.as_str() == "elem1",
        TraceEvent::End(e) => e.endpoint.as_str() == "elem1",
    }));
    assert_eq!(events[1].timestamp(), 4);
}
