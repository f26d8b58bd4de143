use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use shared::api::{AcademicUnitDto, ApiReply, BranchDto, CaseNumberDto, DepartmentDto, ModalityDto};
use shared::event::Generation;
use shared::form::Field;
use shared::resolver::CaseOrigin;
use shared::{Effect, Event, Model};

const BASE: &str = "https://ucvapi.azure-api.net/defensoriauniversitaria/api/";

fn http_calls(effects: &[Effect]) -> Vec<(String, String, serde_json::Value)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => {
                let body = if request.operation.body.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_slice(&request.operation.body).unwrap()
                };
                Some((
                    request.operation.method.clone(),
                    request.operation.url.clone(),
                    body,
                ))
            }
            _ => None,
        })
        .collect()
}

fn branch_dto(code: &str, name: &str, estab: &str) -> BranchDto {
    BranchDto {
        legal_entity_code: code.into(),
        display_name: Some(name.into()),
        establishment_id: estab.into(),
    }
}

fn loaded_model(app: &AppTester<shared::App, Effect>) -> Model {
    let mut model = Model::default();
    app.update(
        Event::BranchesLoaded(ApiReply::Success(vec![
            branch_dto("0002", "Trujillo", "TRU"),
            branch_dto("0001", "Ate", "abc"),
            branch_dto("0003", "  ", "XXX"),
        ])),
        &mut model,
    );
    model
}

fn select(app: &AppTester<shared::App, Effect>, model: &mut Model, code: &str) -> Vec<Effect> {
    app.update(
        Event::BranchSelected {
            legal_entity_code: Some(code.into()),
        },
        model,
    )
    .effects
}

#[test]
fn startup_requests_branches_and_modalities() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::AppStarted, &mut model);
    let calls = http_calls(&update.effects);

    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&(
        "GET".into(),
        format!("{BASE}DUSevicioWeb/CampusDU"),
        serde_json::Value::Null
    )));
    assert!(calls.contains(&(
        "GET".into(),
        format!("{BASE}DUSevicioWeb/ModalidadesDU"),
        serde_json::Value::Null
    )));
    assert!(model.branches.loading);
    assert!(model.modalities.loading);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn branch_directory_is_filtered_and_sorted() {
    let app = AppTester::<shared::App, Effect>::default();
    let model = loaded_model(&app);

    let names: Vec<_> = model
        .branches
        .items
        .iter()
        .map(|b| b.display_name.as_str())
        .collect();
    assert_eq!(names, ["Ate", "Trujillo"]);
    assert!(!model.branches.loading);
}

#[test]
fn branch_failure_is_observable_and_retryable() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::BranchesLoaded(ApiReply::failure("timeout")), &mut model);
    assert!(model.branches.items.is_empty());
    assert!(model.branches.has_error());
    assert_eq!(
        app.view(&model).branches.error.as_deref(),
        Some(shared::BRANCHES_FAILED_MESSAGE)
    );

    let update = app.update(Event::BranchesRequested, &mut model);
    assert_eq!(http_calls(&update.effects).len(), 1);
    assert!(!model.branches.has_error());
}

#[test]
fn modalities_failure_clears_list() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::ModalitiesLoaded(ApiReply::Success(vec![
            ModalityDto {
                code: "2".into(),
                description: Some("Semipresencial".into()),
            },
            ModalityDto {
                code: "1".into(),
                description: Some("A distancia".into()),
            },
        ])),
        &mut model,
    );
    assert_eq!(model.modalities.items[0].label, "A distancia");

    app.update(Event::ModalitiesLoaded(ApiReply::failure("boom")), &mut model);
    assert!(model.modalities.items.is_empty());
    assert!(!model.modalities.loading);
    assert!(model.modalities.has_error());
}

#[test]
fn selecting_a_branch_fires_three_scoped_requests() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    let calls = http_calls(&select(&app, &mut model, "0001"));

    assert_eq!(calls.len(), 3);
    assert!(calls.contains(&(
        "POST".into(),
        format!("{BASE}DUSevicioWeb/NumeroExpedienteDU"),
        serde_json::json!({ "cperjuridica": "0001" })
    )));
    assert!(calls.contains(&(
        "POST".into(),
        format!("{BASE}DUSevicioWeb/UnidadesAcademicasDU"),
        serde_json::json!({ "cperjuridica": "0001" })
    )));
    assert!(calls.contains(&(
        "POST".into(),
        format!("{BASE}DUSevicioWeb/DepartamentosDU"),
        serde_json::json!({ "estabid": "abc" })
    )));

    assert!(model.academic_units.loading);
    assert!(model.departments.loading);
    assert!(model.case_loading);
    assert_eq!(model.form.value(Field::Branch), "0001");
}

#[test]
fn branch_change_clears_dependent_selections() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    select(&app, &mut model, "0001");
    let generation = model.selection_generation;
    app.update(
        Event::AcademicUnitsLoaded {
            generation,
            reply: ApiReply::Success(vec![AcademicUnitDto {
                code: "4".into(),
                name: Some("Derecho".into()),
            }]),
        },
        &mut model,
    );
    app.update(
        Event::FieldEdited {
            field: Field::AcademicUnit,
            value: "4".into(),
        },
        &mut model,
    );
    assert_eq!(model.academic_units.items.len(), 1);

    select(&app, &mut model, "0002");

    assert_eq!(model.form.value(Field::AcademicUnit), "");
    assert_eq!(model.form.value(Field::Area), "");
    assert!(model.academic_units.items.is_empty());
    assert!(model.case_record.is_none());
}

#[test]
fn stale_replies_are_dropped() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    select(&app, &mut model, "0001");
    let first = model.selection_generation;
    select(&app, &mut model, "0002");
    let second = model.selection_generation;
    assert_ne!(first, second);

    let update = app.update(
        Event::DepartmentsLoaded {
            generation: first,
            reply: ApiReply::Success(vec![DepartmentDto {
                code: "9".into(),
                name: Some("Logística".into()),
            }]),
        },
        &mut model,
    );
    assert!(update.effects.is_empty());
    assert!(model.departments.items.is_empty());
    assert!(model.departments.loading);

    app.update(
        Event::CaseNumberResolved {
            generation: first,
            reply: ApiReply::failure("late"),
        },
        &mut model,
    );
    assert!(model.case_record.is_none());

    app.update(
        Event::DepartmentsLoaded {
            generation: second,
            reply: ApiReply::Success(vec![DepartmentDto {
                code: "3".into(),
                name: Some("Contabilidad".into()),
            }]),
        },
        &mut model,
    );
    assert_eq!(model.departments.items.len(), 1);
    assert!(!model.departments.loading);
}

#[test]
fn server_case_number_is_adopted() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    select(&app, &mut model, "0002");
    app.update(
        Event::CaseNumberResolved {
            generation: model.selection_generation,
            reply: ApiReply::Success(CaseNumberDto {
                nro_expediente: Some(120),
                codigo_expediente: Some("EXP-TRU-0120".into()),
                correo_expediente: Some("defensoria.tru@example.edu.pe".into()),
            }),
        },
        &mut model,
    );

    let record = model.case_record.as_ref().unwrap();
    assert_eq!(record.numeric_id, 120);
    assert_eq!(record.origin, CaseOrigin::Server);
    assert!(!model.case_loading);
    assert_eq!(app.view(&model).case_code.as_deref(), Some("EXP-TRU-0120"));
}

#[test]
fn failed_case_numbers_fall_back_to_local_counter() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    for expected in ["EXPE-ABC-0001", "EXPE-ABC-0002"] {
        select(&app, &mut model, "0001");
        app.update(
            Event::CaseNumberResolved {
                generation: model.selection_generation,
                reply: ApiReply::failure("503"),
            },
            &mut model,
        );
        let record = model.case_record.as_ref().unwrap();
        assert_eq!(record.display_code, expected);
        assert_eq!(record.origin, CaseOrigin::LocalFallback);
    }
}

#[test]
fn reset_then_reselect_repeats_the_same_requests() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    let first = http_calls(&select(&app, &mut model, "0001"));
    app.update(Event::ResetRequested, &mut model);
    assert!(model.selected_branch.is_none());
    assert_eq!(model.form.value(Field::Branch), "");

    let second = http_calls(&select(&app, &mut model, "0001"));
    assert_eq!(first, second);
}

#[test]
fn clearing_the_selection_issues_no_requests() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    select(&app, &mut model, "0001");
    let update = app.update(
        Event::BranchSelected {
            legal_entity_code: None,
        },
        &mut model,
    );
    assert!(http_calls(&update.effects).is_empty());
    assert!(model.selected_branch.is_none());
    assert!(!model.case_loading);
}

#[test]
fn unknown_branch_is_ignored() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = loaded_model(&app);

    let calls = http_calls(&select(&app, &mut model, "9999"));
    assert!(calls.is_empty());
    assert!(model.selected_branch.is_none());
}

#[test]
fn configured_base_url_is_used() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = Model::default();

    let config = shared::config::AppConfig {
        api_base_url: "https://du.example.edu/api".into(),
        ..Default::default()
    };
    app.update(Event::Configure(Box::new(config)), &mut model);
    let calls = http_calls(&app.update(Event::AppStarted, &mut model).effects);
    assert!(calls
        .iter()
        .any(|(_, url, _)| url == "https://du.example.edu/api/DUSevicioWeb/CampusDU"));
}

#[test]
fn invalid_configuration_keeps_previous() {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = Model::default();

    let config = shared::config::AppConfig {
        api_base_url: "ftp://du.example.edu/".into(),
        ..Default::default()
    };
    app.update(Event::Configure(Box::new(config)), &mut model);
    assert_eq!(model.config, shared::config::AppConfig::default());
    assert_eq!(
        app.view(&model).error.map(|e| e.error_code),
        Some("CONFIGURATION_ERROR".to_string())
    );
    assert_eq!(Generation::default(), model.selection_generation);
}

fn only_http_request(effects: Vec<Effect>) -> Request<HttpRequest> {
    let mut requests: Vec<_> = effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn reply_to_branches(response: HttpResponse) -> Model {
    let app = AppTester::<shared::App, Effect>::default();
    let mut model = Model::default();
    let mut request = only_http_request(app.update(Event::BranchesRequested, &mut model).effects);

    let update = app
        .resolve(&mut request, HttpResult::Ok(response))
        .expect("branches request resolves");
    for event in update.events {
        app.update(event, &mut model);
    }
    model
}

#[test]
fn branch_directory_decoded_from_the_wire() {
    let model = reply_to_branches(
        HttpResponse::ok()
            .json(serde_json::json!({
                "isSuccess": true,
                "lstItem": [
                    { "cPerJuridica": 2, "cPerApellido": "Trujillo", "pS_ESTABID": "TRU" },
                    { "cPerJuridica": "0001", "cPerApellido": "Ate", "estabid": "ATE" }
                ]
            }))
            .build(),
    );

    let app = AppTester::<shared::App, Effect>::default();
    let view = app.view(&model);
    assert!(view.branches.error.is_none());
    let labels: Vec<_> = view.branches.options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Ate", "Trujillo"]);
}

#[test]
fn soft_failure_envelope_marks_the_directory_failed() {
    let model = reply_to_branches(
        HttpResponse::ok()
            .json(serde_json::json!({ "isSuccess": false, "mensaje": "Servicio en mantenimiento" }))
            .build(),
    );

    let view = AppTester::<shared::App, Effect>::default().view(&model);
    assert!(view.branches.options.is_empty());
    assert_eq!(
        view.branches.error.as_deref(),
        Some(shared::BRANCHES_FAILED_MESSAGE)
    );
}

#[test]
fn undecodable_body_marks_the_directory_failed() {
    let model = reply_to_branches(HttpResponse::ok().body(b"<html>".to_vec()).build());

    let view = AppTester::<shared::App, Effect>::default().view(&model);
    assert!(view.branches.options.is_empty());
    assert!(view.branches.error.is_some());
    assert!(!view.branches.loading);
}
