//! Comparison outcomes for policy pairs, ported from real download API
//! responses: equivalence under generated noise, mismatch on semantic
//! changes, errors on undecodable input.

use fleetdiff_compare::{compare_policies, CompareError};

struct Case {
    title: &'static str,
    expected: &'static str,
    found: &'static str,
    equal: bool,
}

#[test]
fn comparison_verdicts() {
    let cases = [
        Case {
            title: "same content",
            expected: "foo: \"2e19c1c4-185b-11ef-a7fc-43855f39047f\"\n",
            found: "foo: \"2e19c1c4-185b-11ef-a7fc-43855f39047f\"\n",
            equal: true,
        },
        Case {
            title: "ignored ids",
            expected: "id: \"2e19c1c4-185b-11ef-a7fc-43855f39047f\"\n",
            found: "id: \"8ddb2260-185b-11ef-9bb0-6753eb8e2b83\"\n",
            equal: true,
        },
        Case {
            title: "clean namespaces if empty",
            expected: "",
            found: "namespaces: []\n",
            equal: true,
        },
        Case {
            title: "clean namespaces if default",
            expected: "",
            found: "namespaces: [default]\n",
            equal: true,
        },
        Case {
            title: "clean namespaces only if empty",
            expected: "namespaces: []\n",
            found: "namespaces: [foo]\n",
            equal: false,
        },
        Case {
            title: "clean suffix in package policy name",
            expected: "
inputs:
    - data_stream:
        namespace: ep
      meta:
        package:
            name: test_package
      name: test-name
      streams: []
      type: test_package/logs
      use_output: default
",
            found: "
inputs:
    - data_stream:
        namespace: ep
      meta:
        package:
            name: test_package
      name: test-name-12345
",
            equal: false,
        },
        Case {
            title: "clean expected",
            expected: "
inputs:
    - data_stream:
        namespace: ep
      meta:
        package:
            name: sql_input
      name: test-mysql-sql_input
      streams:
        - data_stream:
            dataset: sql_input.sql_query
          sql_response_format: variables
      type: sql/metrics
      use_output: default
output_permissions:
    default:
        _elastic_agent_checks:
            cluster:
                - monitor
        8d024b11-4e82-4192-8e7f-be71d1b13aac:
            indices:
                - names:
                    - metrics-*-*
secret_references:
    - {}
",
            found: "
id: 8fb82eb0-185c-11ef-b65b-9b66b5f5b53c
revision: 2
agent: {}
fleet: {}
outputs: {}
inputs:
    - id: package/9d111234-185c-11ef-9f2d-ebbd90f9ac83
      revision: 2
      data_stream:
        namespace: ep
      meta:
        package:
            name: sql_input
            version: 1.0.0
      name: test-mysql-sql_input
      package_policy_id: b2775cd2-185c-11ef-bf70-b7bd5adaa788
      streams:
        - data_stream:
            dataset: sql_input.sql_query
          sql_response_format: variables
      type: sql/metrics
      use_output: default
namespaces: []
output_permissions:
    default:
        _elastic_agent_checks:
            cluster:
                - monitor
        c02bd2c2-185c-11ef-8e9b-b7fa6a98a253:
            indices:
                - names:
                    - metrics-*-*
secret_references:
    - id: asdaddsaads
",
            equal: true,
        },
        Case {
            title: "clean but different",
            expected: "
inputs:
    - name: test-mysql-sql_input
      streams:
        - sql_response_format: variables
",
            found: "
inputs:
    - name: test-mysql-sql_input
      streams:
        - sql_response_format: table
",
            equal: false,
        },
        Case {
            title: "clean exporter endpoints",
            expected: "
exporters:
    elasticsearch/default:
        endpoints:
            - https://elasticsearch:9200
",
            found: "
exporters:
    elasticsearch/default:
        endpoints:
            - https://abc123def.elastic.cloud:443
",
            equal: true,
        },
    ];

    for case in cases {
        let diff = compare_policies(case.expected.as_bytes(), case.found.as_bytes())
            .unwrap_or_else(|err| panic!("{}: unexpected error: {err}", case.title));
        if case.equal {
            assert!(diff.is_empty(), "{}: unexpected diff:\n{diff}", case.title);
        } else {
            assert!(!diff.is_empty(), "{}: expected a diff", case.title);
        }
    }
}

#[test]
fn undecodable_found_policy_is_an_error_not_a_diff() {
    let err = compare_policies(b"id: abc\n", b"404 Not Found\n").unwrap_err();
    assert!(matches!(err, CompareError::Found(_)));
    assert!(err.to_string().starts_with("failed to prepare found policy"));
}

#[test]
fn undecodable_expected_policy_is_reported_as_the_expected_side() {
    let err = compare_policies(b"404 Not Found\n", b"id: abc\n").unwrap_err();
    assert!(matches!(err, CompareError::Expected(_)));
    assert!(err
        .to_string()
        .starts_with("failed to prepare expected policy"));
}

#[test]
fn the_diff_carries_want_and_got_labels_with_context() {
    let diff = compare_policies(
        b"name: one\nperiod: 10s\nformat: variables\n",
        b"name: one\nperiod: 10s\nformat: table\n",
    )
    .unwrap();
    assert!(diff.starts_with("--- want\n+++ got\n"));
    assert!(diff.contains("-format: variables\n"));
    assert!(diff.contains("+format: table\n"));
    assert!(diff.contains(" name: one\n"), "context line missing:\n{diff}");
}

#[test]
fn comparing_a_policy_with_itself_is_reflexive() {
    let policy = b"inputs:\n- name: a\n  streams: []\nnamespaces: []\n";
    let diff = compare_policies(policy, policy).unwrap();
    assert!(diff.is_empty());
}
