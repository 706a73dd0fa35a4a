use instruct::{DefaultDecodeContext, Record};

use crate::common::{QueryOperation, Request, request, setup};

#[derive(Debug, Default, Record)]
struct Lookup {
    #[instruct("query")]
    pub key: String,
    #[instruct("query,required=false")]
    pub limit: Option<u8>,
}

fn decoder() -> instruct::Decoder<Request, DefaultDecodeContext> {
    instruct::Decoder::builder()
        .operation("query", QueryOperation { strict: true })
        .build()
}

#[test]
fn strict_query_accepts_fully_used_input() {
    setup();
    let mut ctx = DefaultDecodeContext::default();
    let mut value = Lookup::default();
    decoder()
        .decode(&request("/?key=a&limit=2", &[], ""), &mut value, &mut ctx)
        .unwrap();
    assert_eq!(value.key, "a");
    assert!(ctx.all_used_values().contains("query", "limit"));
}

#[test]
fn strict_query_rejects_unused_parameters() {
    setup();
    let err = decoder()
        .decode(
            &request("/?key=a&debug=1", &[], ""),
            &mut Lookup::default(),
            &mut DefaultDecodeContext::default(),
        )
        .unwrap_err();
    insta::assert_snapshot!(err, @"some values were not used on operation 'query'");
}

#[test]
fn operation_errors_are_reported_verbatim() {
    setup();
    let decoder = instruct::Decoder::<Request, DefaultDecodeContext>::builder()
        .operation_fn("fail", |_ctx, _input, _target, _tag| {
            Err("upstream unavailable".into())
        })
        .build();

    #[derive(Debug, Default, Record)]
    struct Remote {
        #[instruct("fail")]
        pub value: String,
    }

    let err = decoder
        .decode(
            &request("/", &[], ""),
            &mut Remote::default(),
            &mut DefaultDecodeContext::default(),
        )
        .unwrap_err();
    insta::assert_snapshot!(err, @"upstream unavailable");
}
