//! Cross-referencing of the OpenAPI document with the scanned skeleton.
//!
//! The skeleton decides which service an operation belongs to (the file that
//! declares its function), the document decides everything else. Operations
//! are looked up in the flat index of the skeleton, so tags and file
//! groupings do not have to agree.

// Internal imports (std, crate)
use std::collections::{BTreeMap, HashSet};

use crate::{
    ast::{Api, Header, Operation, PathVar, Query, Service, Typedef},
    openapi::{OpenApiContext, OpenApiOperation, OpenApiParameter},
    skeleton::Skeleton,
    types::{map_schema, TypeError, TypeExpr},
    utils::{
        field_name, header_field_name, router_path, service_name_from_tag, struct_name_from_ref,
        title_case, to_snake_case,
    },
    Error,
};

// External imports (alphabetized)
use serde_json::Value as JsonValue;

const JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Builds an [`Api`] out of a skeleton and an OpenAPI document.
pub struct Reconciler<'a> {
    skeleton: &'a Skeleton,
    spec: &'a OpenApiContext,
    server_vars: &'a BTreeMap<String, String>,
    ignored_tags: HashSet<&'a str>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        skeleton: &'a Skeleton,
        spec: &'a OpenApiContext,
        server_vars: &'a BTreeMap<String, String>,
        ignored_tags: &'a [String],
    ) -> Self {
        Self {
            skeleton,
            spec,
            server_vars,
            ignored_tags: ignored_tags.iter().map(String::as_str).collect(),
        }
    }

    /// Reconcile every operation of the document.
    pub fn reconcile(&self) -> crate::Result<Api> {
        let root_path = self.spec.root_path(self.server_vars)?;
        log::debug!("Server root path: {:?}", root_path);

        let mut services: Vec<Service> = self
            .skeleton
            .services
            .iter()
            .map(|scanned| Service {
                name: scanned.name.clone(),
                file_name: format!("{}.go", to_snake_case(&scanned.name)),
                comment: String::new(),
                operations: Vec::new(),
            })
            .collect();

        let mut seen = HashSet::new();
        for op in self.spec.operations()? {
            if let Some(tag) = op.tags.iter().find(|t| self.ignored_tags.contains(t.as_str())) {
                log::info!(
                    "Skipping {} {}: tag {:?} is ignored",
                    op.method,
                    op.path,
                    tag
                );
                continue;
            }

            let id = op.id.as_deref().ok_or_else(|| {
                Error::bad_spec(format!(
                    "key \"operationId\" not exists in {} {}",
                    op.method, op.path
                ))
            })?;
            let name = title_case(id);
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateOperation {
                    name,
                    detail: "operationId used twice in the OpenAPI document".to_string(),
                });
            }

            let index = self
                .skeleton
                .service_index(&name)
                .ok_or_else(|| Error::UnknownOperation(name.clone()))?;
            let operation = self.reconcile_operation(name, &root_path, &op)?;
            services[index].operations.push(operation);
        }

        for (tag, description) in self.spec.tags() {
            if self.ignored_tags.contains(tag.as_str()) {
                continue;
            }
            let service_name = service_name_from_tag(&tag);
            let service = services
                .iter_mut()
                .find(|svc| svc.name == service_name)
                .ok_or_else(|| Error::UnknownService {
                    tag: tag.clone(),
                    service: service_name.clone(),
                })?;
            service.comment = description;
        }

        services.retain(|svc| {
            if svc.operations.is_empty() {
                log::info!("Service {} has no operation, not emitted", svc.name);
            }
            !svc.operations.is_empty()
        });

        Ok(Api {
            root_path,
            services,
            typedefs: self.typedefs()?,
            model_files: self.skeleton.models.clone(),
        })
    }

    fn reconcile_operation(
        &self,
        name: String,
        root_path: &str,
        op: &OpenApiOperation,
    ) -> crate::Result<Operation> {
        let mut operation = Operation {
            path: format!("{}{}", root_path, router_path(&op.path)),
            http_method: op.method,
            comment: op.summary.clone().unwrap_or_default(),
            path_vars: Vec::new(),
            queries: Vec::new(),
            headers: Vec::new(),
            request_body: None,
            response: None,
            name,
        };

        for param in &op.parameters {
            self.add_parameter(&mut operation, param)?;
        }
        operation.request_body = self.request_body(&operation.name, op)?;
        operation.response = self.response(&operation.name, op)?;

        log::debug!(
            "Reconciled {} {} {}",
            operation.http_method,
            operation.path,
            operation.name
        );
        Ok(operation)
    }

    fn add_parameter(&self, operation: &mut Operation, param: &OpenApiParameter) -> crate::Result<()> {
        let location = || format!("parameter {:?} of {}", param.name, operation.name);

        let schema = param
            .effective_schema()
            .ok_or_else(|| Error::no_schema(location()))?;
        let ty = map_schema(schema, param.is_required()).map_err(|source| Error::Schema {
            location: location(),
            source,
        })?;

        match param.in_.as_str() {
            "path" => {
                // A referenced component is bound as the primitive it names.
                let ty = match ty.primitive() {
                    Some(_) => ty,
                    None if schema.get("$ref").is_some() => {
                        let resolved = self.spec.resolve(schema)?;
                        map_schema(resolved, param.is_required()).map_err(|source| {
                            Error::Schema {
                                location: location(),
                                source,
                            }
                        })?
                    }
                    None => ty,
                };
                let binder = ty.primitive().ok_or_else(|| Error::Schema {
                    location: location(),
                    source: TypeError::UnsupportedSchema(format!(
                        "path variables must be primitives, got {ty}"
                    )),
                })?;
                operation.path_vars.push(PathVar {
                    field: field_name(&param.name),
                    name: param.name.clone(),
                    ty,
                    binder,
                });
            }
            "query" => operation.queries.push(Query {
                field: field_name(&param.name),
                name: param.name.clone(),
                ty,
            }),
            "header" => operation.headers.push(Header {
                field: header_field_name(&param.name),
                name: param.name.clone(),
                ty,
            }),
            kind => {
                return Err(Error::UnknownParamKind {
                    operation: operation.name.clone(),
                    param: param.name.clone(),
                    kind: kind.to_string(),
                });
            }
        }
        Ok(())
    }

    fn request_body(&self, name: &str, op: &OpenApiOperation) -> crate::Result<Option<TypeExpr>> {
        let Some(body) = &op.request_body else {
            return Ok(None);
        };
        let location = || format!("request body of {name}");

        if OpenApiOperation::has_media(body, JSON) {
            let schema = OpenApiOperation::media_schema(body, JSON)
                .ok_or_else(|| Error::no_schema(location()))?;
            let reference = schema
                .get("$ref")
                .and_then(JsonValue::as_str)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| Error::Schema {
                    location: location(),
                    source: TypeError::InlineObjectsNotAllowed,
                })?;
            let struct_name = struct_name_from_ref(reference).map_err(|source| Error::Schema {
                location: location(),
                source,
            })?;
            return Ok(Some(TypeExpr::Named(struct_name)));
        }

        if OpenApiOperation::has_media(body, OCTET_STREAM) {
            return Ok(Some(TypeExpr::Bytes));
        }

        Err(Error::no_schema(format!(
            "{}: only {JSON} and {OCTET_STREAM} are supported",
            location()
        )))
    }

    fn response(&self, name: &str, op: &OpenApiOperation) -> crate::Result<Option<TypeExpr>> {
        let Some(ok) = op.responses.get("200") else {
            return Ok(None);
        };
        let location = || format!("200 response of {name}");

        let schema = OpenApiOperation::media_schema(ok, JSON)
            .ok_or_else(|| Error::no_schema(location()))?;
        map_schema(schema, false)
            .map(Some)
            .map_err(|source| Error::Schema {
                location: location(),
                source,
            })
    }

    fn typedefs(&self) -> crate::Result<Vec<Typedef>> {
        self.spec
            .array_schemas()
            .into_iter()
            .map(|(name, schema)| {
                let target = map_schema(schema, true).map_err(|source| Error::Schema {
                    location: format!("schema {name:?}"),
                    source,
                })?;
                Ok(Typedef {
                    name: title_case(name),
                    target,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::HttpMethod;
    use crate::types::Primitive;
    use std::path::Path;

    const API_PETS: &str = "package openapi\n\nfunc CreatePets() {}\nfunc ListPets() {}\nfunc ShowPetById() {}\nfunc DeletePet() {}\nfunc UploadFile() {}\n";

    const PETSTORE: &str = r#"
openapi: 3.0.0
info: {title: Petstore, version: 1.0.0}
servers:
  - url: http://petstore.swagger.io/{version}
tags:
  - name: pets
    description: Everything about your Pets
paths:
  /pets:
    get:
      operationId: listPets
      summary: List all pets
      tags: [pets]
      parameters:
        - name: limit
          in: query
          schema: {type: integer, format: int32}
      responses:
        '200':
          description: A paged array of pets
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pets'}
    post:
      operationId: createPets
      summary: Create a pet
      tags: [pets]
      parameters:
        - name: X-Tag
          in: header
          schema: {type: string}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Result'}
  /pets/{petId}:
    get:
      operationId: showPetById
      tags: [pets]
      parameters:
        - name: petId
          in: path
          required: true
          schema: {type: string}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
    delete:
      operationId: deletePet
      tags: [pets]
      parameters:
        - name: petId
          in: path
          required: true
          schema: {type: integer, format: int64}
      responses:
        '204':
          description: deleted
  /pets/{petId}/file:
    put:
      operationId: uploadFile
      tags: [pets]
      parameters:
        - name: petId
          in: path
          required: true
          schema: {type: integer, format: int64}
        - name: additionalMetadata
          in: query
          schema: {type: string}
      requestBody:
        content:
          application/octet-stream:
            schema: {type: string, format: binary}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Result'}
components:
  schemas:
    Pet:
      type: object
      properties:
        id: {type: integer, format: int64}
    Pets:
      type: array
      items: {$ref: '#/components/schemas/Pet'}
    Result:
      type: object
      properties:
        message: {type: string}
"#;

    fn skeleton(sources: &[(&str, &str)]) -> Skeleton {
        let mut skeleton = Skeleton::default();
        for (path, src) in sources {
            skeleton.add_source(Path::new(path), src).unwrap();
        }
        skeleton
    }

    fn vars() -> BTreeMap<String, String> {
        BTreeMap::from([("version".to_string(), "v1".to_string())])
    }

    fn reconcile(doc: &str, ignored: &[String]) -> crate::Result<Api> {
        let skeleton = skeleton(&[("go/api_pets.go", API_PETS)]);
        let spec = OpenApiContext::parse_content(doc).unwrap();
        let vars = vars();
        Reconciler::new(&skeleton, &spec, &vars, ignored).reconcile()
    }

    #[test]
    fn test_list_pets() {
        let api = reconcile(PETSTORE, &[]).unwrap();
        assert_eq!(api.root_path, "/v1");
        let service = api.service("PetsService").unwrap();
        assert_eq!(service.file_name, "pets_service.go");
        assert_eq!(service.comment, "Everything about your Pets");

        let op = service.operation("ListPets").unwrap();
        assert_eq!(op.http_method, HttpMethod::Get);
        assert_eq!(op.path, "/v1/pets");
        assert_eq!(op.comment, "List all pets");
        assert_eq!(
            op.queries,
            vec![Query {
                name: "limit".into(),
                ty: TypeExpr::optional(TypeExpr::Primitive(Primitive::Int32)),
                field: "Limit".into(),
            }]
        );
        assert_eq!(
            op.response,
            Some(TypeExpr::optional(TypeExpr::Named("Pets".into())))
        );
    }

    #[test]
    fn test_operations_follow_document_order() {
        let api = reconcile(PETSTORE, &[]).unwrap();
        let names: Vec<_> = api.services[0]
            .operations
            .iter()
            .map(|op| op.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["ListPets", "CreatePets", "ShowPetById", "DeletePet", "UploadFile"]
        );
    }

    #[test]
    fn test_show_pet_path_var() {
        let api = reconcile(PETSTORE, &[]).unwrap();
        let op = api.operation("ShowPetById").unwrap();
        assert_eq!(op.path, "/v1/pets/:petId");
        assert_eq!(op.path_vars.len(), 1);
        assert_eq!(op.path_vars[0].field, "PetId");
        assert_eq!(op.path_vars[0].binder, Primitive::String);
        assert_eq!(op.path_vars[0].ty, TypeExpr::Primitive(Primitive::String));
    }

    #[test]
    fn test_create_pets_header() {
        let api = reconcile(PETSTORE, &[]).unwrap();
        let op = api.operation("CreatePets").unwrap();
        assert_eq!(op.headers[0].name, "X-Tag");
        assert_eq!(op.headers[0].field, "XTag");
        assert!(op.headers[0].ty.is_optional());
        assert_eq!(
            op.response,
            Some(TypeExpr::optional(TypeExpr::Named("Result".into())))
        );
    }

    #[test]
    fn test_upload_and_delete() {
        let api = reconcile(PETSTORE, &[]).unwrap();
        let upload = api.operation("UploadFile").unwrap();
        assert_eq!(upload.http_method, HttpMethod::Put);
        assert_eq!(upload.request_body, Some(TypeExpr::Bytes));
        assert_eq!(upload.path_vars[0].binder, Primitive::Int64);
        assert_eq!(upload.queries[0].field, "AdditionalMetadata");

        let delete = api.operation("DeletePet").unwrap();
        assert_eq!(delete.http_method, HttpMethod::Delete);
        assert_eq!(delete.response, None);
        assert_eq!(delete.request_body, None);
    }

    #[test]
    fn test_referenced_path_var_binds_its_primitive() {
        let doc = PETSTORE
            .replace(
                "          schema: {type: integer, format: int64}\n      responses:\n        '204'",
                "          schema: {$ref: '#/components/schemas/PetId'}\n      responses:\n        '204'",
            )
            .replace("    Result:\n", "    PetId: {type: integer, format: int64}\n    Result:\n");
        let api = reconcile(&doc, &[]).unwrap();
        let delete = api.operation("DeletePet").unwrap();
        assert_eq!(delete.path_vars[0].binder, Primitive::Int64);
        assert_eq!(delete.path_vars[0].ty, TypeExpr::Primitive(Primitive::Int64));

        let doc = doc.replace(
            "    PetId: {type: integer, format: int64}\n",
            "    PetId: {type: object, properties: {id: {type: string}}}\n",
        );
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }), "{err}");
    }

    #[test]
    fn test_typedefs_and_models() {
        let api = reconcile(PETSTORE, &[]).unwrap();
        assert_eq!(
            api.typedefs,
            vec![Typedef {
                name: "Pets".into(),
                target: TypeExpr::sequence(TypeExpr::Named("Pet".into())),
            }]
        );
    }

    #[test]
    fn test_unknown_operation() {
        let doc = PETSTORE.replace("operationId: deletePet", "operationId: removePet");
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(ref name) if name == "RemovePet"));
    }

    #[test]
    fn test_unknown_service() {
        let doc = PETSTORE.replace(
            "  - name: pets\n",
            "  - name: store\n    description: Store\n  - name: pets\n",
        );
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownService { ref service, .. } if service == "StoreService"));
    }

    #[test]
    fn test_ignored_tags() {
        let api = reconcile(PETSTORE, &["pets".to_string()]).unwrap();
        assert!(api.services.is_empty());
        assert_eq!(api.typedefs.len(), 1);
    }

    #[test]
    fn test_duplicate_operation_id() {
        let doc = PETSTORE.replace("operationId: deletePet", "operationId: showPetById");
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::DuplicateOperation { .. }));
    }

    #[test]
    fn test_inline_request_body_rejected() {
        let doc = PETSTORE.replace(
            "      parameters:\n        - name: X-Tag",
            "      requestBody:\n        content:\n          application/json:\n            schema:\n              type: object\n              properties:\n                name: {type: string}\n      parameters:\n        - name: X-Tag",
        );
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema {
                source: TypeError::InlineObjectsNotAllowed,
                ..
            }
        ));
    }

    #[test]
    fn test_parameter_errors() {
        let doc = PETSTORE.replace("in: header", "in: cookie");
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownParamKind { ref kind, .. } if kind == "cookie"));

        let doc = PETSTORE.replace(
            "          in: query\n          schema: {type: integer, format: int32}",
            "          in: query",
        );
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::NoSchema(_)));
    }

    #[test]
    fn test_response_without_json_schema() {
        let doc = PETSTORE.replace(
            "        '204':\n          description: deleted",
            "        '200':\n          description: deleted",
        );
        let err = reconcile(&doc, &[]).unwrap_err();
        assert!(matches!(err, Error::NoSchema(ref msg) if msg.contains("DeletePet")));
    }
}
