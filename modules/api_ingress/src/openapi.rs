use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

pub const TITLE: &str = "Turnstile API";

/// Empty document carrying the server's info block; module docs merge into it.
pub fn base_document() -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(TITLE)
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Facility booking and attendance verification"))
                .build(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_paths_keep_base_info() {
        let mut doc = base_document();
        let mut other = OpenApiBuilder::new().build();
        other.paths.paths.insert(
            "/things".to_string(),
            utoipa::openapi::path::PathItem::default(),
        );
        doc.merge(other);

        assert_eq!(doc.info.title, TITLE);
        assert!(doc.paths.paths.contains_key("/things"));
    }
}
