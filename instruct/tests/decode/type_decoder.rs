use instruct::{BuildError, DefaultDecodeContext, Record, TypeDecoder, map_tags};

use crate::common::{Request, builder, request, setup};

#[derive(Debug, Default, PartialEq, Record)]
struct Page {
    #[instruct("query")]
    pub number: u32,
    #[instruct("header,name=x-lang,required=false")]
    pub lang: Option<String>,
}

type PageDecoder = TypeDecoder<Request, DefaultDecodeContext, Page>;

#[test]
fn decodes_fresh_values() {
    setup();
    let decoder = PageDecoder::new(builder().build()).unwrap();
    let page = decoder
        .decode(
            &request("/?number=4", &[("x-lang", "de")], ""),
            &mut DefaultDecodeContext::default(),
        )
        .unwrap();
    assert_eq!(
        page,
        Page {
            number: 4,
            lang: Some("de".into()),
        }
    );
}

#[test]
fn decode_into_keeps_what_is_absent() {
    setup();
    let decoder = PageDecoder::new(builder().build()).unwrap();
    let mut page = Page {
        number: 0,
        lang: Some("en".into()),
    };
    decoder
        .decode_into(
            &request("/?number=2", &[], ""),
            &mut page,
            &mut DefaultDecodeContext::default(),
        )
        .unwrap();
    assert_eq!(page.number, 2);
    assert_eq!(page.lang.as_deref(), Some("en"));
}

#[test]
fn map_tags_up_front_and_per_call() {
    setup();
    let request = request("/?number=1&n=5&lang=fr", &[("x-number", "9")], "");

    let decoder = PageDecoder::with_map_tags(
        builder().build(),
        &map_tags! { "number" => "query,name=n" },
    )
    .unwrap();
    let page = decoder
        .decode(&request, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(page.number, 5);

    let page = decoder
        .decode_with(
            &request,
            &mut DefaultDecodeContext::default(),
            &map_tags! { "lang" => "query" },
        )
        .unwrap();
    assert_eq!(page.number, 5);
    assert_eq!(page.lang.as_deref(), Some("fr"));

    // the bound plan is unchanged
    let page = decoder
        .decode(&request, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(page.lang, None);
}

#[test]
fn configuration_errors_surface_on_creation() {
    #[derive(Debug, Default, Record)]
    struct Broken {
        #[instruct("query,required=maybe")]
        pub id: u32,
    }

    setup();
    let err = TypeDecoder::<Request, DefaultDecodeContext, Broken>::new(builder().build())
        .unwrap_err();
    assert!(matches!(err, BuildError::Tag { ref path, .. } if path == "id"));

    let err = PageDecoder::with_map_tags(builder().build(), &map_tags! { "missing" => "query" })
        .unwrap_err();
    insta::assert_snapshot!(err, @"map tags field 'missing' was declared but not used");
}

#[test]
fn map_tags_configure_undeclared_fields() {
    #[derive(Debug, Default, Record)]
    struct Untagged {
        #[instruct("query")]
        pub page: u32,
        pub name: String,
    }

    setup();
    let decoder = TypeDecoder::<Request, DefaultDecodeContext, Untagged>::with_map_tags(
        builder().build(),
        &map_tags! { "name" => "header,name=x-name" },
    )
    .unwrap();
    let request = request("/?page=3", &[("x-name", "ann")], "");

    let value = decoder
        .decode(&request, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.page, 3);
    assert_eq!(value.name, "ann");

    // the wrapped decoder keeps them as the defaults of the type
    let mut value = Untagged::default();
    decoder
        .decoder()
        .decode(&request, &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.name, "ann");
}
