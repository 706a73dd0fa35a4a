use instruct::{DecodeOptions, DefaultDecodeContext, MapTags, Record, map_tags};

use crate::common::{Request, builder, request, setup};

#[derive(Debug, Default, PartialEq, Record)]
struct Paging {
    #[instruct("query")]
    pub page: u32,
    #[instruct("query,name=per_page,required=false")]
    pub size: Option<u32>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Listing {
    #[instruct("header,name=x-user")]
    pub user: String,
    #[instruct(flatten)]
    pub paging: Paging,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Report {
    #[instruct("recurse")]
    pub paging: Paging,
    #[instruct("query,required=false")]
    pub format: Option<String>,
}

type Decoder = instruct::Decoder<Request, DefaultDecodeContext>;

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Decoder>();
};

fn decode_with<T: Record>(
    decoder: &Decoder,
    request: &Request,
    map_tags: Option<&MapTags>,
) -> Result<T, instruct::DecodeError> {
    let mut value = T::default();
    let mut ctx = DefaultDecodeContext::default();
    let mut options = DecodeOptions::new(&mut ctx);
    if let Some(map_tags) = map_tags {
        options = options.map_tags(map_tags);
    }
    decoder.decode_with(request, &mut value, options)?;
    Ok(value)
}

#[test]
fn declared_directives() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request("/?page=2&per_page=10", &[("x-user", "bob")], "");

    let value: Listing = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(
        value,
        Listing {
            user: "bob".into(),
            paging: Paging {
                page: 2,
                size: Some(10),
            },
        }
    );
}

#[test]
fn map_tags_win_over_declared_directives() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request("/?u=ann&page=1&per_page=5", &[("x-page", "7")], "");

    // flattened fields are addressed at the level of their parent
    let map_tags = map_tags! {
        "user" => "query,name=u",
        "page" => "header,name=x-page",
    };
    let value: Listing = decode_with(&decoder, &request, Some(&map_tags)).unwrap();
    assert_eq!(value.user, "ann");
    assert_eq!(value.paging.page, 7);
    assert_eq!(value.paging.size, Some(5));

    let map_tags = map_tags! {
        "paging" => { "page" => "header,name=x-page" },
    };
    let value: Report = decode_with(&decoder, &request, Some(&map_tags)).unwrap();
    assert_eq!(value.paging.page, 7);
}

#[test]
fn call_map_tags_leave_the_cache_alone() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let before = decoder.struct_info::<Report>().unwrap().to_string();

    let request = request("/?page=1", &[("x-page", "7")], "");
    let map_tags = map_tags! {
        "paging" => { "page" => "header,name=x-page" },
    };
    let value: Report = decode_with(&decoder, &request, Some(&map_tags)).unwrap();
    assert_eq!(value.paging.page, 7);

    let value: Report = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.paging.page, 1);
    assert_eq!(decoder.struct_info::<Report>().unwrap().to_string(), before);
}

#[test]
fn different_call_map_tags_stay_apart() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request("/?page=1&u=ann&o=eve", &[("x-user", "bob")], "");
    let first = map_tags! { "user" => "query,name=u" };
    let second = map_tags! { "user" => "query,name=o" };

    let value: Listing = decode_with(&decoder, &request, Some(&first)).unwrap();
    assert_eq!(value.user, "ann");
    let value: Listing = decode_with(&decoder, &request, Some(&second)).unwrap();
    assert_eq!(value.user, "eve");
    let value: Listing = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.user, "bob");
    let value: Listing = decode_with(&decoder, &request, Some(&first)).unwrap();
    assert_eq!(value.user, "ann");
}

#[test]
fn decoders_are_shared_between_threads() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request("/?page=2&u=ann&o=eve", &[("x-user", "bob")], "");
    let cases = [
        (Some(map_tags! { "user" => "query,name=u" }), "ann"),
        (Some(map_tags! { "user" => "query,name=o" }), "eve"),
        (None, "bob"),
    ];

    std::thread::scope(|scope| {
        let handles: Vec<_> = cases
            .iter()
            .map(|(map_tags, user)| {
                let (decoder, request) = (&decoder, &request);
                scope.spawn(move || {
                    for _ in 0..50 {
                        let value: Listing =
                            decode_with(decoder, request, map_tags.as_ref()).unwrap();
                        assert_eq!(value.user, *user);
                        assert_eq!(value.paging.page, 2);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}

#[test]
fn every_map_tags_entry_must_match_a_field() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request("/?page=1", &[], "");

    let map_tags = map_tags! {
        "paging" => { "offset" => "query" },
    };
    let err = decode_with::<Report>(&decoder, &request, Some(&map_tags)).unwrap_err();
    insta::assert_snapshot!(err, @"map tags field 'paging.offset' was declared but not used");

    let map_tags = map_tags! {
        "format" => { "kind" => "query" },
    };
    let err = decode_with::<Report>(&decoder, &request, Some(&map_tags)).unwrap_err();
    insta::assert_snapshot!(
        err,
        @"invalid map tags entry for field 'format': only directives are allowed on non-struct fields"
    );
}

#[test]
fn default_map_tags() {
    setup();
    let request = request("/?page=1&p=3", &[("x-user", "bob"), ("x-owner", "eve")], "");

    let decoder = builder::<DefaultDecodeContext>()
        .default_map_tags::<Listing>(map_tags! { "user" => "header,name=x-owner" })
        .build();
    let value: Listing = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.user, "eve");

    // call map tags apply over the defaults
    let value: Listing =
        decode_with(&decoder, &request, Some(&map_tags! { "page" => "query,name=p" })).unwrap();
    assert_eq!(value.user, "eve");
    assert_eq!(value.paging.page, 3);

    decoder.set_default_map_tags::<Listing>(MapTags::new());
    let value: Listing = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.user, "bob");
}

#[test]
fn map_tags_as_default_persist() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let request = request("/?page=1", &[("x-user", "bob"), ("x-owner", "eve")], "");

    let map_tags = map_tags! { "user" => "header,name=x-owner" };
    let mut value = Listing::default();
    let mut ctx = DefaultDecodeContext::default();
    decoder
        .decode_with(
            &request,
            &mut value,
            DecodeOptions::new(&mut ctx)
                .map_tags(&map_tags)
                .map_tags_as_default(),
        )
        .unwrap();
    assert_eq!(value.user, "eve");

    let value: Listing = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.user, "eve");
}

#[test]
fn field_name_mapper_names_untagged_directives() {
    #[derive(Debug, Default, Record)]
    struct Trace {
        #[instruct("header")]
        pub request_id: String,
        #[instruct("query")]
        pub span_id: String,
    }

    setup();
    let decoder = builder::<DefaultDecodeContext>()
        .field_name_mapper(|operation, field| match operation {
            "header" => format!("x-{}", field.replace('_', "-")),
            _ => field.to_owned(),
        })
        .build();
    let request = request("/?span_id=s1", &[("x-request-id", "r1")], "");

    let value: Trace = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.request_id, "r1");
    assert_eq!(value.span_id, "s1");
}

#[test]
fn fields_need_a_directive() {
    #[derive(Debug, Default, Record)]
    struct Untagged {
        #[instruct("query")]
        pub page: u32,
        pub name: String,
    }

    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let err = decoder.struct_info::<Untagged>().unwrap_err();
    insta::assert_snapshot!(err, @"field 'name' configuration not found");

    // call map tags apply over the declared plan, which cannot be built
    let request = request("/?page=1&name=x", &[], "");
    let map_tags = map_tags! { "name" => "query" };
    assert!(decode_with::<Untagged>(&decoder, &request, Some(&map_tags)).is_err());

    let decoder = builder::<DefaultDecodeContext>()
        .default_map_tags::<Untagged>(map_tags)
        .build();
    let value: Untagged = decode_with(&decoder, &request, None).unwrap();
    assert_eq!(value.page, 1);
    assert_eq!(value.name, "x");
}
