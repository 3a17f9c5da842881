//! Fixtures shared by the integration tests

#![allow(dead_code)]

use rockmatrix::system::MockSystem;

pub const REPO_ROOT: &str = "/repo";

pub const GENERAL_CI_YAML_WITH_REGISTRIES: &str = r"
version: 1
ghcr:
    upload: true
    cve-scan: false
registries:
    docker.io:
        uri: docker.io/ubuntu
        auth:
            - method: basic
              config:
                username: secrets.DOCKER_IO_USERNAME
                password: secrets.DOCKER_IO_PASSWORD
    ecr:
        uri: public.ecr.aws/ubuntu
        auth:
            - method: ecr
              config:
                region: us-east-1
                username: secrets.ECR_USERNAME
                password: secrets.ECR_PASSWORD
    acr:
        uri: myregistry.azurecr.io/ubuntu
        auth:
            - method: bearer
              config:
                token: secrets.ACR_PASSWORD
    ecr-public:
        uri: public.ecr.aws/rocksdev
        auth:
            - method: ecr-public
              config:
                region: us-east-1
                username: secrets.ECR_PUBLIC_USERNAME
                password: secrets.ECR_PUBLIC_PASSWORD
";

pub const GENERAL_CI_YAML_WITHOUT_REGISTRIES: &str = r"
version: 1
ghcr:
    upload: true
    cve-scan: false
registries:
";

pub const ROCKCRAFT_YAML_MOCK_ROCK_1_0: &str = r"
name: mock-rock
version: 1.0
base: bare
build-base: ubuntu:24.04
";

pub const ROCKCRAFT_YAML_ANOTHER_ROCK_2_0: &str = r"
name: another-rock
version: 2.0
base: bare
build-base: ubuntu:24.04
";

pub const ROCKCRAFT_YAML_VERSION_LATEST: &str = r"
name: latest-rock
version: latest
base: bare
build-base: ubuntu@24.04
";

pub const ROCKCRAFT_YAML_INVALID_BASE: &str = r"
name: invalid-rock
version: 1.0
base: ubuntu:noble
";

pub const ROCKCRAFT_YAML_DEVEL_BASE: &str = r"
name: devel-rock
version: 1.0
base: bare
build-base: devel
";

pub const ROCKCRAFT_YAML_JAMMY_BASE: &str = r"
name: jammy-rock
version: 3.1
base: ubuntu@22.04
";

/// Append an `images:` section to a configuration header
pub fn with_images(header: &str, images: &str) -> String {
    format!("{header}images:\n{images}")
}

/// In-memory repository with one rock per fixture above
pub fn mock_repo() -> MockSystem {
    MockSystem::new()
        .with_file(
            "/repo/mock-rock/1.0/rockcraft.yaml",
            ROCKCRAFT_YAML_MOCK_ROCK_1_0.as_bytes(),
        )
        .unwrap()
        .with_file("/repo/mock-rock/1.0/spread.yaml", b"project: mock-rock\n")
        .unwrap()
        .with_file(
            "/repo/another-rock/2.0/rockcraft.yaml",
            ROCKCRAFT_YAML_ANOTHER_ROCK_2_0.as_bytes(),
        )
        .unwrap()
        .with_file(
            "/repo/latest-rock/latest/rockcraft.yaml",
            ROCKCRAFT_YAML_VERSION_LATEST.as_bytes(),
        )
        .unwrap()
        .with_file(
            "/repo/invalid-rock/1.0/rockcraft.yaml",
            ROCKCRAFT_YAML_INVALID_BASE.as_bytes(),
        )
        .unwrap()
        .with_file(
            "/repo/devel-rock/1.0/rockcraft.yaml",
            ROCKCRAFT_YAML_DEVEL_BASE.as_bytes(),
        )
        .unwrap()
        .with_file(
            "/repo/jammy-rock/3.1/rockcraft.yaml",
            ROCKCRAFT_YAML_JAMMY_BASE.as_bytes(),
        )
        .unwrap()
}

/// Repository with exactly the two rocks used by wildcard tests
pub fn two_rock_repo() -> MockSystem {
    MockSystem::new()
        .with_file(
            "/repo/mock-rock/1.0/rockcraft.yaml",
            ROCKCRAFT_YAML_MOCK_ROCK_1_0.as_bytes(),
        )
        .unwrap()
        .with_file(
            "/repo/another-rock/2.0/rockcraft.yaml",
            ROCKCRAFT_YAML_ANOTHER_ROCK_2_0.as_bytes(),
        )
        .unwrap()
}
