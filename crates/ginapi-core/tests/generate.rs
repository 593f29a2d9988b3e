//! End-to-end generation over the petstore skeleton

use std::path::{Path, PathBuf};

use ginapi_core::{generate, Config, Error};
use tempfile::TempDir;

/// Copy the fixture skeleton into a scratch directory.
fn petstore() -> TempDir {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/petstore");
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&src, dir.path());
    dir
}

fn copy_dir(src: &Path, dest: &Path) {
    std::fs::create_dir_all(dest).unwrap();
    for entry in std::fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dest.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn config(input: &Path) -> Config {
    let mut config = Config::new(input);
    config.gofmt = None;
    config
        .server_vars
        .insert("host".into(), "petstore.swagger.io".into());
    config.server_vars.insert("version".into(), "v1".into());
    config
}

fn read(path: PathBuf) -> String {
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[tokio::test]
async fn generates_the_package() {
    let input = petstore();
    let written = generate(&config(input.path())).await.unwrap();

    let out = input.path().join("ginapi");
    let mut names: Vec<_> = written
        .iter()
        .map(|p| {
            assert!(p.starts_with(&out));
            p.file_name().unwrap().to_string_lossy().into_owned()
        })
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "common.go",
            "model_order.go",
            "model_pet.go",
            "model_result.go",
            "models.go",
            "pets_service.go",
            "routers.go",
            "store_service.go",
            "validation.go",
        ]
    );
}

#[tokio::test]
async fn list_pets_binds_optional_query() {
    let input = petstore();
    generate(&config(input.path())).await.unwrap();
    let pets = read(input.path().join("ginapi/pets_service.go"));

    assert!(pets.starts_with("// Code generated by ginapi. DO NOT EDIT.\n\npackage ginapi\n"));
    assert!(pets.contains("\tLimit *int32 `form:\"limit\"`\n"));
    assert!(pets.contains("\t// ListPets List all pets\n\tListPets(q ListPetsQueries) (*Pets, error)\n"));
    assert!(pets.contains("if err := c.ShouldBindQuery(&q); err != nil {"));
    assert!(pets.contains("resp, err := defaultPetsService.ListPets(q)"));
    assert!(pets.contains(
        "[]string{\"ListPets\", \"CreatePets\", \"ShowPetById\", \"DeletePet\", \"UploadFile\"}"
    ));
}

#[tokio::test]
async fn show_pet_binds_path_variable() {
    let input = petstore();
    generate(&config(input.path())).await.unwrap();
    let pets = read(input.path().join("ginapi/pets_service.go"));

    assert!(pets.contains("type ShowPetByIdPathVars struct {\n\tPetId string\n}"));
    assert!(pets.contains("ShowPetById(vars ShowPetByIdPathVars) (*Pet, error)"));
    assert!(pets.contains("v, err := ParamString(c, \"petId\")"));
    assert!(pets.contains("vars.PetId = v\n"));
    assert!(pets.contains("URL:        \"/v1/pets/:petId\","));
}

#[tokio::test]
async fn optional_path_variable_is_a_pointer() {
    let input = petstore();
    let spec = input.path().join("api/openapi.yaml");
    let doc = read(spec.clone()).replace(
        "        description: The id of the pet to retrieve\n        required: true\n",
        "        description: The id of the pet to retrieve\n",
    );
    std::fs::write(&spec, doc).unwrap();

    generate(&config(input.path())).await.unwrap();
    let pets = read(input.path().join("ginapi/pets_service.go"));

    assert!(pets.contains("type ShowPetByIdPathVars struct {\n\tPetId *string\n}"));
    assert!(pets.contains("vars.PetId = &v\n"));
    // Other path variables keep their required binding.
    assert!(pets.contains("type DeletePetPathVars struct {\n\tPetId int64\n}"));
}

#[tokio::test]
async fn create_pets_binds_header_and_json_body() {
    let input = petstore();
    generate(&config(input.path())).await.unwrap();
    let pets = read(input.path().join("ginapi/pets_service.go"));

    assert!(pets.contains("\tXTag *string `header:\"X-Tag\"`\n"));
    assert!(pets.contains("CreatePets(h CreatePetsHeaders, req Pet) (*Result, error)"));
    assert!(pets.contains("var req Pet\n\tif err := c.ShouldBindJSON(&req); err != nil {"));
    assert!(pets.contains("HttpMethod: \"POST\","));
}

#[tokio::test]
async fn upload_reads_raw_body_and_delete_returns_error_only() {
    let input = petstore();
    generate(&config(input.path())).await.unwrap();
    let pets = read(input.path().join("ginapi/pets_service.go"));

    assert!(pets.contains(
        "UploadFile(vars UploadFilePathVars, q UploadFileQueries, req []byte) (*Result, error)"
    ));
    assert!(pets.contains("req, err := c.GetRawData()"));
    assert!(pets.contains("URL:        \"/v1/pets/:petId/uploadImage\","));

    assert!(pets.contains("DeletePet(vars DeletePetPathVars) error"));
    assert!(pets.contains("v, err := ParamInt64(c, \"petId\")"));
    assert!(pets.contains("if err := defaultPetsService.DeletePet(vars); err != nil {"));
    assert!(pets.contains("c.Status(http.StatusOK)"));
}

#[tokio::test]
async fn routers_models_and_copies() {
    let input = petstore();
    generate(&config(input.path())).await.unwrap();
    let out = input.path().join("ginapi");

    let routers = read(out.join("routers.go"));
    assert!(routers.contains("\tinstallPetsServiceRoutes(r)\n\tinstallStoreServiceRoutes(r)\n\treturn r\n"));

    let store = read(out.join("store_service.go"));
    assert!(store.contains(
        "// StoreService Access to Petstore orders\n// Orders are kept for a week\ntype StoreService interface {"
    ));
    assert!(store.contains("GetOrderById(vars GetOrderByIdPathVars) (*Order, error)"));

    let models = read(out.join("models.go"));
    assert!(models.contains("type Pets = []Pet"));

    let pet = read(out.join("model_pet.go"));
    assert!(pet.contains("\npackage ginapi\n"));
    assert!(!pet.contains("package openapi"));
    assert!(pet.contains("Tag string `json:\"tag,omitempty\"`"));
}

fn is_gofmt_available() -> bool {
    std::process::Command::new("gofmt")
        .arg("-l")
        .stdin(std::process::Stdio::null())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn generated_sources_are_gofmt_clean() {
    if !is_gofmt_available() {
        println!("Skipping test: gofmt not available");
        return;
    }
    let input = petstore();
    let mut config = config(input.path());
    config.gofmt = Some("gofmt".into());
    let written = generate(&config).await.unwrap();

    let generated: Vec<_> = written
        .iter()
        .filter(|p| !p.file_name().unwrap().to_string_lossy().starts_with("model_"))
        .collect();
    assert!(!generated.is_empty());
    let output = std::process::Command::new("gofmt")
        .arg("-l")
        .args(&generated)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "");
}

#[tokio::test]
async fn gin_context_comes_first() {
    let input = petstore();
    let mut config = config(input.path());
    config.gin_context = true;
    generate(&config).await.unwrap();
    let pets = read(input.path().join("ginapi/pets_service.go"));

    assert!(pets.contains("ListPets(c *gin.Context, q ListPetsQueries) (*Pets, error)"));
    assert!(pets.contains("defaultPetsService.UploadFile(c, vars, q, req)"));
}

#[tokio::test]
async fn ignored_tags_drop_their_service() {
    let input = petstore();
    let mut config = config(input.path());
    config.ignored_tags = vec!["store".into()];
    let written = generate(&config).await.unwrap();

    assert!(!written.iter().any(|p| p.ends_with("store_service.go")));
    let routers = read(input.path().join("ginapi/routers.go"));
    assert!(!routers.contains("installStoreServiceRoutes"));
}

#[tokio::test]
async fn inline_request_body_writes_nothing() {
    let input = petstore();
    let spec = input.path().join("api/openapi.yaml");
    let doc = read(spec.clone()).replace(
        "              $ref: '#/components/schemas/Pet'\n        required: true",
        "              type: object\n              properties:\n                name:\n                  type: string\n        required: true",
    );
    std::fs::write(&spec, doc).unwrap();

    let err = generate(&config(input.path())).await.unwrap_err();
    assert!(matches!(err, Error::Schema { .. }), "{err}");
    assert_eq!(
        err.to_string(),
        "request body of CreatePets: inline objects not allowed, use $ref instead"
    );
    assert!(!input.path().join("ginapi").exists());
}

#[tokio::test]
async fn missing_server_variable_is_a_bad_spec() {
    let input = petstore();
    let mut config = config(input.path());
    config.server_vars.remove("host");

    let err = generate(&config).await.unwrap_err();
    assert!(matches!(err, Error::BadSpec(_)), "{err}");
    assert_eq!(err.component(), "loader");
}

#[tokio::test]
async fn unknown_operation_names_the_function() {
    let input = petstore();
    let api = input.path().join("go/api_store.go");
    let src = read(api.clone()).replace("func GetOrderById(", "func GetOrder(");
    std::fs::write(&api, src).unwrap();

    let err = generate(&config(input.path())).await.unwrap_err();
    assert!(matches!(err, Error::UnknownOperation(ref name) if name == "GetOrderById"));
}

#[tokio::test]
async fn input_must_be_a_directory() {
    let input = petstore();
    let err = generate(&config(&input.path().join("missing")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InputMissing(_)));

    let file = input.path().join("api/openapi.yaml");
    let err = generate(&config(&file)).await.unwrap_err();
    assert!(matches!(err, Error::InputNotDirectory(_)));
}
