use opsflow::models::request::{ApprovableRequest, RequestPayload, RequestStatus, Requester};
use opsflow::models::query::{QuerySpec, SortOrder};
use opsflow::services::query::{parse_request_date, query_requests};

fn make_request(id: i64, status: RequestStatus, fecha: &str) -> ApprovableRequest {
    ApprovableRequest {
        id,
        request_number: format!("SOL-{:04}", id),
        status,
        requester: Requester {
            name: format!("Solicitante {}", id),
            area: "Operaciones".to_string(),
            management_unit: "Gerencia Mina".to_string(),
            email: Some(format!("user{}@cmsg.cl", id)),
        },
        submitted_at: parse_request_date(fecha),
        submitted_at_raw: fecha.to_string(),
        payload: RequestPayload::UserCreate {
            full_name: format!("Usuario Nuevo {}", id),
            rut: Some("12.345.678-9".to_string()),
            position: Some("Analista".to_string()),
            proposed_role: Some("SOLICITANTE".to_string()),
            username: None,
        },
        review_comment: None,
        reviewer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_sorts_ahead_then_oldest_first_across_all() {
        // Scenario: [REJECTED 03/01, PENDING 01/01, APPROVED 02/01] must
        // come out as [PENDING 01/01, APPROVED 02/01, REJECTED 03/01]:
        // pending first, then oldest first among the terminal ones.
        let collection = vec![
            make_request(1, RequestStatus::Rejected, "03/01/2024"),
            make_request(2, RequestStatus::Pending, "01/01/2024"),
            make_request(3, RequestStatus::Approved, "02/01/2024"),
        ];

        let page = query_requests(&collection, &QuerySpec::page(1, 10)).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn sort_is_stable_for_equal_status_and_date() {
        let collection = vec![
            make_request(10, RequestStatus::Pending, "05/03/2024"),
            make_request(11, RequestStatus::Pending, "05/03/2024"),
            make_request(12, RequestStatus::Pending, "05/03/2024"),
        ];

        let page = query_requests(&collection, &QuerySpec::page(1, 10)).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn pagination_geometry_23_items_pagesize_6() {
        let collection: Vec<_> = (1..=23)
            .map(|i| make_request(i, RequestStatus::Pending, "01/02/2024"))
            .collect();

        let first = query_requests(&collection, &QuerySpec::page(1, 6)).unwrap();
        assert_eq!(first.total_count, 23);
        assert_eq!(first.total_pages, 4);
        assert_eq!(first.items.len(), 6);

        let last = query_requests(&collection, &QuerySpec::page(4, 6)).unwrap();
        assert_eq!(last.items.len(), 5);
    }

    #[test]
    fn pages_partition_the_collection() {
        let collection: Vec<_> = (1..=23)
            .map(|i| make_request(i, RequestStatus::Pending, "01/02/2024"))
            .collect();

        let mut seen = Vec::new();
        let first = query_requests(&collection, &QuerySpec::page(1, 6)).unwrap();
        for page_no in 1..=first.total_pages {
            let page = query_requests(&collection, &QuerySpec::page(page_no, 6)).unwrap();
            for item in &page.items {
                assert!(!seen.contains(&item.id), "item {} on two pages", item.id);
                seen.push(item.id);
            }
        }
        assert_eq!(seen.len(), 23);
    }

    #[test]
    fn identical_inputs_yield_identical_pages() {
        let collection = vec![
            make_request(1, RequestStatus::Rejected, "03/01/2024"),
            make_request(2, RequestStatus::Pending, "01/01/2024"),
            make_request(3, RequestStatus::Approved, "02/01/2024"),
        ];
        let spec = QuerySpec {
            search_text: "solicitante".to_string(),
            page: 1,
            page_size: 2,
            ..QuerySpec::default()
        };

        let a = query_requests(&collection, &spec).unwrap();
        let b = query_requests(&collection, &spec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn text_filter_is_case_insensitive_over_all_searchable_fields() {
        let mut collection = vec![
            make_request(1, RequestStatus::Pending, "01/01/2024"),
            make_request(2, RequestStatus::Pending, "01/01/2024"),
        ];
        // Match by request number on one, by requester name on the other.
        collection[0].request_number = "SOL-ABC".to_string();
        collection[1].requester.name = "María Abcedaria".to_string();

        let spec = QuerySpec {
            search_text: "abc".to_string(),
            page: 1,
            page_size: 10,
            ..QuerySpec::default()
        };
        let page = query_requests(&collection, &spec).unwrap();
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn date_range_is_inclusive_and_parsed_day_first() {
        // 02/03/2024 is March 2nd, not February 3rd.
        let collection = vec![
            make_request(1, RequestStatus::Pending, "01/03/2024"),
            make_request(2, RequestStatus::Pending, "02/03/2024"),
            make_request(3, RequestStatus::Pending, "03/03/2024"),
            make_request(4, RequestStatus::Pending, "04/03/2024"),
        ];

        let spec = QuerySpec {
            date_from: parse_request_date("02/03/2024"),
            date_to: parse_request_date("03/03/2024"),
            page: 1,
            page_size: 10,
            ..QuerySpec::default()
        };
        let page = query_requests(&collection, &spec).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn status_and_type_filters_are_anded() {
        let mut collection = vec![
            make_request(1, RequestStatus::Pending, "01/01/2024"),
            make_request(2, RequestStatus::Approved, "01/01/2024"),
            make_request(3, RequestStatus::Pending, "01/01/2024"),
        ];
        collection[2].payload = RequestPayload::Other {
            kind_label: "Otro Tipo".to_string(),
        };

        let spec = QuerySpec {
            status_filter: Some(RequestStatus::Pending),
            type_filter: Some("Creación".to_string()),
            page: 1,
            page_size: 10,
            ..QuerySpec::default()
        };
        let page = query_requests(&collection, &spec).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn page_beyond_total_is_clamped() {
        let collection: Vec<_> = (1..=5)
            .map(|i| make_request(i, RequestStatus::Pending, "01/02/2024"))
            .collect();

        let page = query_requests(&collection, &QuerySpec::page(9, 2)).unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn empty_result_is_one_empty_page_not_an_error() {
        let collection = vec![make_request(1, RequestStatus::Pending, "01/01/2024")];
        let spec = QuerySpec {
            search_text: "no-such-text".to_string(),
            page: 1,
            page_size: 10,
            ..QuerySpec::default()
        };

        let page = query_requests(&collection, &spec).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn zero_page_or_page_size_is_invalid_query() {
        let collection = vec![make_request(1, RequestStatus::Pending, "01/01/2024")];

        let err = query_requests(&collection, &QuerySpec::page(0, 10)).unwrap_err();
        assert!(matches!(err, opsflow::AppError::InvalidQuery(_)));
        let err = query_requests(&collection, &QuerySpec::page(1, 0)).unwrap_err();
        assert!(matches!(err, opsflow::AppError::InvalidQuery(_)));
    }

    #[test]
    fn date_descending_sort_is_honored() {
        let collection = vec![
            make_request(1, RequestStatus::Approved, "01/01/2024"),
            make_request(2, RequestStatus::Approved, "03/01/2024"),
            make_request(3, RequestStatus::Approved, "02/01/2024"),
        ];
        let spec = QuerySpec {
            sort: SortOrder::DateDescending,
            page: 1,
            page_size: 10,
            ..QuerySpec::default()
        };
        let page = query_requests(&collection, &spec).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn unparseable_dates_sort_first_and_fail_date_from() {
        let collection = vec![
            make_request(1, RequestStatus::Approved, "01/01/2024"),
            make_request(2, RequestStatus::Approved, "no es fecha"),
        ];

        let page = query_requests(&collection, &QuerySpec::page(1, 10)).unwrap();
        assert_eq!(page.items[0].id, 2);

        let spec = QuerySpec {
            date_from: parse_request_date("01/01/2020"),
            page: 1,
            page_size: 10,
            ..QuerySpec::default()
        };
        let page = query_requests(&collection, &spec).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
