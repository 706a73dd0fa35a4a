use instruct::{DefaultDecodeContext, Record};

use crate::common::{builder, request, setup};

#[derive(Debug, Default, PartialEq, Record)]
struct Scalars {
    #[instruct("header,name=x-count")]
    pub count: u8,
    #[instruct("header,name=x-offset")]
    pub offset: i64,
    #[instruct("query")]
    pub ratio: f64,
    #[instruct("query")]
    pub verbose: bool,
    #[instruct("query")]
    pub grade: char,
    #[instruct("query,name=q")]
    pub search: String,
}

#[test]
fn every_primitive_from_text() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request(
        "/items?ratio=0.5&verbose=true&grade=A&q=red+shoes",
        &[("x-count", "12"), ("x-offset", "-40")],
        "",
    );

    let mut value = Scalars::default();
    decoder
        .decode(&request, &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(
        value,
        Scalars {
            count: 12,
            offset: -40,
            ratio: 0.5,
            verbose: true,
            grade: 'A',
            search: "red shoes".into(),
        }
    );
}

#[test]
fn coercion_errors_name_the_field() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let query = "/?ratio=1&verbose=1&grade=A&q=";

    let overflow = request(query, &[("x-count", "300"), ("x-offset", "0")], "");
    let err = decoder
        .decode(&overflow, &mut Scalars::default(), &mut DefaultDecodeContext::default())
        .unwrap_err();
    insta::assert_snapshot!(err, @r#"error resolving field 'count': value "300" overflows type u8"#);

    let invalid = request(query, &[("x-count", "1"), ("x-offset", "ten")], "");
    let err = decoder
        .decode(&invalid, &mut Scalars::default(), &mut DefaultDecodeContext::default())
        .unwrap_err();
    insta::assert_snapshot!(err, @r#"error resolving field 'offset': invalid value "ten" for type i64"#);
}

#[test]
fn redecoding_is_idempotent() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request(
        "/?ratio=2.25&verbose=f&grade=z&q=x",
        &[("x-count", "1"), ("x-offset", "2")],
        "",
    );

    let mut once = Scalars::default();
    decoder
        .decode(&request, &mut once, &mut DefaultDecodeContext::default())
        .unwrap();
    let mut twice = Scalars::default();
    decoder
        .decode(&request, &mut twice, &mut DefaultDecodeContext::default())
        .unwrap();
    decoder
        .decode(&request, &mut twice, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(once, twice);
}

#[cfg(feature = "jiff02")]
#[test]
fn time_types() {
    use core::time::Duration;

    use jiff::{SignedDuration, Timestamp};

    #[derive(Debug, Default, Record)]
    struct Window {
        #[instruct("query")]
        pub since: Timestamp,
        #[instruct("query")]
        pub span: SignedDuration,
        #[instruct("header,name=x-timeout")]
        pub timeout: Option<Duration>,
    }

    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request(
        "/?since=2024-06-19T15:22:45Z&span=PT1H",
        &[("x-timeout", "2s")],
        "",
    );

    let mut value = Window::default();
    decoder
        .decode(&request, &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.since.as_second(), 1_718_810_565);
    assert_eq!(value.span, SignedDuration::from_hours(1));
    assert_eq!(value.timeout, Some(Duration::from_secs(2)));
}
