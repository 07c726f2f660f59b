//! Route wiring and request handlers.
//!
//! Every insert follows the same sequence: read the multipart form, write the
//! file, write the document, acknowledge. A document write that fails after
//! the file write leaves the file behind; there is no compensating delete,
//! only a warning naming the orphan.

use std::{collections::HashMap, net::SocketAddr};

use actix_cors::Cors;
use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{
    web::{self, resource, scope, Data, Json, ServiceConfig},
    App, HttpResponse, HttpServer,
};
use futures_util::TryStreamExt as _;
use tracing::{info, warn};

use crate::{
    core::{
        data::DocStore,
        uploads::{UploadPolicy, UploadStore, IMAGE_UPLOADS},
    },
    error::ApiError,
    types::{Ack, Client, Project},
};

pub async fn start_server(
    addr: SocketAddr,
    store: DocStore,
    uploads: UploadStore,
) -> std::io::Result<()> {
    let store = Data::new(store);
    let uploads = Data::new(uploads);
    HttpServer::new(move || {
        let store = store.clone();
        let uploads = uploads.clone();
        App::new()
            .configure(|cfg| configure(cfg, store, uploads))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allow_any_method(),
            )
    })
    .bind(addr)?
    .run()
    .await
}

pub fn configure(cfg: &mut ServiceConfig, store: Data<DocStore>, uploads: Data<UploadStore>) {
    let upload_dir = uploads.dir().to_path_buf();
    cfg.app_data(store)
        .app_data(uploads)
        .service(
            scope("/api")
                .service(
                    resource("/projects")
                        .route(web::get().to(list_projects))
                        .route(web::post().to(create_project)),
                )
                .service(
                    resource("/clients")
                        .route(web::get().to(list_clients))
                        .route(web::post().to(create_client)),
                )
                .service(resource("/status").route(web::get().to(status_handler))),
        )
        .service(Files::new("/uploads", upload_dir));
}

async fn create_project(
    store: Data<DocStore>,
    uploads: Data<UploadStore>,
    payload: Multipart,
) -> Result<Json<Ack>, ApiError> {
    let mut form = read_record_form(payload, &IMAGE_UPLOADS).await?;
    let (original_name, bytes) = form
        .take_file()
        .ok_or(ApiError::MissingFile(IMAGE_UPLOADS.field))?;

    let image = uploads.save(&original_name, &bytes)?;
    let project = Project::new(form.text("name"), form.text("description"), image.clone());
    let id = store.insert(project).map_err(|error| {
        warn!(file = %image, "project insert failed, uploaded file left behind");
        error
    })?;

    info!(%id, %image, "project added");
    Ok(Json(Ack::new("Project added successfully!")))
}

async fn create_client(
    store: Data<DocStore>,
    uploads: Data<UploadStore>,
    payload: Multipart,
) -> Result<Json<Ack>, ApiError> {
    let mut form = read_record_form(payload, &IMAGE_UPLOADS).await?;
    let (original_name, bytes) = form
        .take_file()
        .ok_or(ApiError::MissingFile(IMAGE_UPLOADS.field))?;

    let image = uploads.save(&original_name, &bytes)?;
    let client = Client::new(
        form.text("name"),
        form.text("description"),
        form.text("designation"),
        image.clone(),
    );
    let id = store.insert(client).map_err(|error| {
        warn!(file = %image, "client insert failed, uploaded file left behind");
        error
    })?;

    info!(%id, %image, "client added");
    Ok(Json(Ack::new("Client added successfully!")))
}

async fn list_projects(store: Data<DocStore>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(store.list::<Project>()?))
}

async fn list_clients(store: Data<DocStore>) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(store.list::<Client>()?))
}

async fn status_handler() -> HttpResponse {
    HttpResponse::Ok().body("folio api is running")
}

/// A parsed insert form: text fields plus at most one file attachment.
struct RecordForm {
    fields: HashMap<String, String>,
    file: Option<(String, Vec<u8>)>,
}

impl RecordForm {
    /// Missing text fields read as empty strings; field presence is not
    /// validated.
    fn text(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }

    fn take_file(&mut self) -> Option<(String, Vec<u8>)> {
        self.file.take()
    }
}

/// Drain the multipart payload, applying `policy` to the file field.
async fn read_record_form(
    mut payload: Multipart,
    policy: &UploadPolicy,
) -> Result<RecordForm, ApiError> {
    let mut form = RecordForm {
        fields: HashMap::new(),
        file: None,
    };

    while let Some(mut field) = payload.try_next().await.map_err(bad_payload)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == policy.field {
            let original_name = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .map(str::to_owned);
            if let Some(mime) = field.content_type() {
                if !policy.allows(mime.essence_str()) {
                    return Err(ApiError::UnsupportedType(mime.essence_str().to_owned()));
                }
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(bad_payload)? {
                if bytes.len() + chunk.len() > policy.max_bytes {
                    return Err(ApiError::FileTooLarge(policy.max_bytes));
                }
                bytes.extend_from_slice(&chunk);
            }

            match original_name {
                Some(original) if !original.is_empty() => form.file = Some((original, bytes)),
                // Browsers submit an empty part when no file was chosen;
                // treat it as a missing attachment.
                _ if bytes.is_empty() => {}
                _ => form.file = Some(("upload".to_owned(), bytes)),
            }
        } else {
            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(bad_payload)? {
                bytes.extend_from_slice(&chunk);
            }
            form.fields
                .insert(name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    Ok(form)
}

fn bad_payload(error: actix_multipart::MultipartError) -> ApiError {
    ApiError::BadPayload(error.to_string())
}
