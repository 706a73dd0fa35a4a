use instruct::{DecodeError, DefaultDecodeContext, Record};

use crate::common::{builder, request, setup};

#[derive(Debug, Default, Record)]
struct Auth {
    #[instruct("header,name=authorization")]
    pub token: String,
    #[instruct("header,name=x-tenant,required=false")]
    pub tenant: Option<String>,
}

#[derive(Debug, Default, Record)]
struct Call {
    #[instruct("recurse")]
    pub auth: Auth,
    #[instruct("query")]
    pub method: String,
}

#[test]
fn missing_required_fields_name_the_path() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();

    let mut value = Call::default();
    let err = decoder
        .decode(
            &request("/?method=get", &[], ""),
            &mut value,
            &mut DefaultDecodeContext::default(),
        )
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"field 'auth.token' (tag name 'authorization') with operation 'header' is required but was not set"
    );
    let DecodeError::RequiredValueMissing {
        is_struct_option,
        operation,
        field,
        name,
    } = &err
    else {
        panic!("unexpected error: {err}");
    };
    assert!(!*is_struct_option);
    assert_eq!(operation, "header");
    assert_eq!(field, "auth.token");
    assert_eq!(name, "authorization");

    let mut value = Call::default();
    decoder
        .decode(
            &request("/?method=get", &[("authorization", "t")], ""),
            &mut value,
            &mut DefaultDecodeContext::default(),
        )
        .unwrap();
    assert_eq!(value.auth.token, "t");
    assert_eq!(value.auth.tenant, None);
}

#[test]
fn default_required_can_be_turned_off() {
    setup();
    let decoder = builder::<DefaultDecodeContext>()
        .default_required(false)
        .build();

    let mut value = Call {
        method: "keep".into(),
        ..Call::default()
    };
    decoder
        .decode(&request("/", &[], ""), &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.auth.token, "");
    assert_eq!(value.method, "keep");
}

#[test]
fn explicit_required_wins_over_the_default() {
    #[derive(Debug, Default, Record)]
    struct Strict {
        #[instruct("query,required=true")]
        pub id: u64,
    }

    setup();
    let decoder = builder::<DefaultDecodeContext>()
        .default_required(false)
        .build();
    let err = decoder
        .decode(
            &request("/", &[], ""),
            &mut Strict::default(),
            &mut DefaultDecodeContext::default(),
        )
        .unwrap_err();
    insta::assert_snapshot!(
        err,
        @"field 'id' (tag name 'id') with operation 'query' is required but was not set"
    );
}

#[test]
fn ignored_fields_are_never_required() {
    #[derive(Debug, Default, Record)]
    struct Partial {
        #[instruct("-")]
        pub cached: Vec<u8>,
        #[instruct("query,required=false")]
        pub id: Option<u64>,
    }

    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let mut value = Partial {
        cached: vec![1, 2],
        id: None,
    };
    decoder
        .decode(&request("/?cached=9", &[], ""), &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.cached, vec![1, 2]);
}
