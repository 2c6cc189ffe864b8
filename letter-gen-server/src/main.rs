use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, middleware::Logger, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Deserialize;

use letter_gen_core::model::generation_input::{GenerationInput, StartSeed};
use letter_gen_core::model::generator::generate;
use letter_gen_core::model::language_profile::{LanguageProfile, DEFAULT_ORDERS};
use letter_gen_core::model::selector::Strategy;
use letter_gen_core::{list_files, GenError};

const DATA_FOLDER: &str = "./data";

/// Folder holding the `.txt` corpora and `.json` public profiles.
struct DataFolder(PathBuf);

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	words: Option<usize>,
	max_length: Option<usize>,
	strategy: Option<String>,
	seed: Option<String> // none, custom:<letters> or random:<order>[:<seed>]
}

/// Kind of file behind a profile name.
#[derive(Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
enum ProfileKind {
	#[default]
	Corpus,
	Public,
}

#[derive(Deserialize)]
struct ProfileQuery {
	name: Option<String>,
	kind: Option<ProfileKind>,
	orders: Option<String>
}

struct SharedData {
	profile: Option<LanguageProfile>
}

impl GenerateParams {
	/// Builds the generation input, rejecting malformed parameters.
	fn generation_input(&self) -> Result<GenerationInput, GenError> {
		let mut input = GenerationInput::default();
		input.set_word_count(self.words.unwrap_or(5))?;
		if let Some(max_length) = self.max_length {
			input.set_max_word_length(max_length)?;
		}
		if let Some(strategy) = &self.strategy {
			input.strategy = strategy.parse::<Strategy>()?;
		}
		if let Some(seed) = &self.seed {
			input.start_seed = seed.parse::<StartSeed>()?;
		}
		Ok(input)
	}
}

impl ProfileQuery {
	/// Parses `"1,2,3"` into n-gram orders.
	fn orders(&self) -> Result<Vec<usize>, String> {
		match &self.orders {
			None => Ok(DEFAULT_ORDERS.to_vec()),
			Some(s) => s
				.split(',')
				.map(|order| order.trim().parse::<usize>())
				.collect::<Result<Vec<_>, _>>()
				.map_err(|_| "Orders must be a comma separated list of integers".to_owned()),
		}
	}
}

/// Generates a sentence from the loaded profile based on query parameters.
/// Returns the sentence as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.generation_input() {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string())
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Profile lock failed"),
	};
	let Some(profile) = &shared_data.profile else {
		return HttpResponse::Conflict().body("No profile loaded");
	};

	match generate(profile, &input) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e @ (GenError::NotFound(_) | GenError::InvalidArgument(_))) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => {
			error!("generation failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

#[get("/v1/profiles")]
async fn get_profiles(folder: web::Data<DataFolder>) -> impl Responder {
	match list_files(&folder.0, &["txt", "json"]) {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list profiles")
	}
}

#[get("/v1/loaded_profile")]
async fn get_loaded_profile(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Profile lock failed"),
	};
	match &shared_data.profile {
		Some(profile) => HttpResponse::Ok().body(profile.name().to_owned()),
		None => HttpResponse::Ok().body(""),
	}
}

#[put("/v1/load_profile")]
async fn put_profile(
	data: web::Data<Mutex<SharedData>>,
	folder: web::Data<DataFolder>,
	query: web::Query<ProfileQuery>,
) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty profile name"),
	};
	if name.contains(['/', '\\']) || name.contains("..") {
		return HttpResponse::BadRequest().body("Invalid profile name");
	}
	let orders = match query.orders() {
		Ok(orders) => orders,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let loaded = match query.kind.unwrap_or_default() {
		ProfileKind::Corpus => LanguageProfile::load(folder.0.join(format!("{name}.txt")), &orders),
		ProfileKind::Public => LanguageProfile::open_public(folder.0.join(format!("{name}.json"))),
	};
	let profile = match loaded {
		Ok(p) => p,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load profile: {e}"))
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Profile lock failed"),
	};
	info!("profile '{}' loaded, orders {:?}", profile.name(), profile.orders());
	shared_data.profile = Some(profile);

	HttpResponse::Ok().body("Profile loaded successfully")
}

/// Main entry point for the server.
///
/// Starts with no profile; `PUT /v1/load_profile` loads one from `./data`.
/// The server binds to 127.0.0.1:5000.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let shared_data = SharedData {
		profile: None,
	};
	let shared_profile = web::Data::new(Mutex::new(shared_data));
	let data_folder = web::Data::new(DataFolder(PathBuf::from(DATA_FOLDER)));

	info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.wrap(Logger::default())
			.app_data(shared_profile.clone())
			.app_data(data_folder.clone())
			.service(get_generated)
			.service(get_profiles)
			.service(put_profile)
			.service(get_loaded_profile)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test as actix_test;

	fn app_data(profile: Option<LanguageProfile>) -> web::Data<Mutex<SharedData>> {
		web::Data::new(Mutex::new(SharedData { profile }))
	}

	fn data_folder(dir: &tempfile::TempDir) -> web::Data<DataFolder> {
		web::Data::new(DataFolder(dir.path().to_path_buf()))
	}

	#[test]
	fn generate_params_are_validated() {
		let params = GenerateParams { words: Some(2), max_length: Some(0), strategy: None, seed: None };
		assert!(params.generation_input().is_err());

		let params = GenerateParams { words: Some(usize::MAX), max_length: None, strategy: None, seed: None };
		assert!(matches!(params.generation_input(), Err(GenError::InvalidArgument(_))));

		let params = GenerateParams { words: None, max_length: None, strategy: Some("backoff".into()), seed: Some("custom:ab".into()) };
		let input = params.generation_input().unwrap();
		assert_eq!(input.word_count(), 5);
		assert_eq!(input.strategy, Strategy::BackOff);
		assert_eq!(input.start_seed, StartSeed::Custom("ab".into()));
	}

	#[actix_web::test]
	async fn generate_without_profile_is_a_conflict() {
		let app = actix_test::init_service(App::new().app_data(app_data(None)).service(get_generated)).await;
		let req = actix_test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::CONFLICT);
	}

	#[actix_web::test]
	async fn generate_returns_sentence() {
		let profile = LanguageProfile::from_text("hi", "hi hi hi", &DEFAULT_ORDERS).unwrap();
		let app = actix_test::init_service(App::new().app_data(app_data(Some(profile))).service(get_generated)).await;

		let req = actix_test::TestRequest::get().uri("/v1/generate?words=1").to_request();
		let body = actix_test::call_and_read_body(&app, req).await;
		assert_eq!(body, web::Bytes::from_static(b"Hi."));

		let req = actix_test::TestRequest::get().uri("/v1/generate?strategy=unknown").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn huge_word_count_is_a_bad_request() {
		let profile = LanguageProfile::from_text("hi", "hi hi hi", &DEFAULT_ORDERS).unwrap();
		let app = actix_test::init_service(App::new().app_data(app_data(Some(profile))).service(get_generated)).await;

		let req = actix_test::TestRequest::get().uri("/v1/generate?words=18446744073709551615").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let req = actix_test::TestRequest::get().uri("/v1/generate?max_length=18446744073709551615").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn load_profile_rejects_bad_names() {
		let dir = tempfile::tempdir().unwrap();
		let app = actix_test::init_service(
			App::new().app_data(app_data(None)).app_data(data_folder(&dir)).service(put_profile),
		)
		.await;
		let req = actix_test::TestRequest::put().uri("/v1/load_profile?name=../secret").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let req = actix_test::TestRequest::put().uri("/v1/load_profile?name=missing").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[actix_web::test]
	async fn loads_corpus_profile_and_reports_it() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("english.txt"), "the then than").unwrap();
		let app = actix_test::init_service(
			App::new()
				.app_data(app_data(None))
				.app_data(data_folder(&dir))
				.service(put_profile)
				.service(get_loaded_profile)
				.service(get_generated),
		)
		.await;

		let req = actix_test::TestRequest::get().uri("/v1/loaded_profile").to_request();
		assert_eq!(actix_test::call_and_read_body(&app, req).await, web::Bytes::from_static(b""));

		let req = actix_test::TestRequest::put().uri("/v1/load_profile?name=english&orders=1,2,3").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert!(dir.path().join("english.bin").exists());

		let req = actix_test::TestRequest::get().uri("/v1/loaded_profile").to_request();
		assert_eq!(actix_test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"english"));

		let req = actix_test::TestRequest::get().uri("/v1/generate?words=2").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn loads_public_profile() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(
			dir.path().join("french.json"),
			r#"{"name": "fr", "freq": {"l": 4, "e": 3, "le": 2, " l": 2, "e ": 2}}"#,
		)
		.unwrap();
		let app = actix_test::init_service(
			App::new()
				.app_data(app_data(None))
				.app_data(data_folder(&dir))
				.service(put_profile)
				.service(get_loaded_profile),
		)
		.await;

		let req = actix_test::TestRequest::put().uri("/v1/load_profile?name=french&kind=public").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let req = actix_test::TestRequest::get().uri("/v1/loaded_profile").to_request();
		assert_eq!(actix_test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"fr"));

		let req = actix_test::TestRequest::put().uri("/v1/load_profile?name=french&orders=1,x").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn lists_data_files() {
		let dir = tempfile::tempdir().unwrap();
		for file in ["b.txt", "a.json", "a.bin", "notes.md"] {
			std::fs::write(dir.path().join(file), "x").unwrap();
		}
		let app = actix_test::init_service(App::new().app_data(data_folder(&dir)).service(get_profiles)).await;

		let req = actix_test::TestRequest::get().uri("/v1/profiles").to_request();
		let body = actix_test::call_and_read_body(&app, req).await;
		assert_eq!(body, web::Bytes::from_static(b"a.json\nb.txt"));
	}
}
