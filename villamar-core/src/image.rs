use crate::content::ImageRef;

/// Served from the static asset root when a CMS reference is unusable.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Builds dimensioned CDN URLs from opaque CMS image references.
///
/// Asset references look like `image-<id>-<WxH>-<fmt>`. Anything that does
/// not parse (reference mid-upload, wrong kind of asset, truncated id) falls
/// back to [`PLACEHOLDER_IMAGE`]; URL construction never fails a page render.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: &str, dataset: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
        }
    }

    /// Resolve an optional image reference to a concrete URL.
    pub fn url(&self, image: Option<&ImageRef>, width: Option<u32>, height: Option<u32>) -> String {
        image
            .and_then(|image| image.asset.as_ref())
            .and_then(|asset| self.build(&asset.asset_ref, width, height))
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
    }

    fn build(&self, asset_ref: &str, width: Option<u32>, height: Option<u32>) -> Option<String> {
        let mut parts = asset_ref.split('-');
        if parts.next()? != "image" {
            return None;
        }
        let id = parts.next()?;
        let dimensions = parts.next()?;
        let format = parts.next()?;
        if parts.next().is_some() || id.is_empty() || format.is_empty() {
            return None;
        }
        let valid_dimensions = dimensions
            .split_once('x')
            .is_some_and(|(w, h)| w.chars().all(|c| c.is_ascii_digit())
                && h.chars().all(|c| c.is_ascii_digit())
                && !w.is_empty()
                && !h.is_empty());
        if !valid_dimensions {
            return None;
        }

        let mut url = format!(
            "https://cdn.sanity.io/images/{}/{}/{}-{}.{}",
            self.project_id, self.dataset, id, dimensions, format
        );
        let mut push = |key: &str, value: String| {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(key);
            url.push('=');
            url.push_str(&value);
        };
        if let Some(w) = width {
            push("w", w.to_string());
        }
        if let Some(h) = height {
            push("h", h.to_string());
        }
        if width.is_some() && height.is_some() {
            push("fit", "crop".to_string());
        }
        push("auto", "format".to_string());
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::AssetRef;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("vlm01", "production")
    }

    fn image(asset_ref: &str) -> ImageRef {
        ImageRef {
            asset: Some(AssetRef {
                asset_ref: asset_ref.to_string(),
            }),
            alt: None,
        }
    }

    #[test]
    fn test_missing_image_yields_placeholder() {
        assert_eq!(builder().url(None, Some(800), Some(600)), PLACEHOLDER_IMAGE);
        let no_asset = ImageRef {
            asset: None,
            alt: None,
        };
        assert_eq!(builder().url(Some(&no_asset), None, None), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_valid_reference_builds_dimensioned_url() {
        let img = image("image-abc123-1200x800-jpg");
        let url = builder().url(Some(&img), Some(640), Some(480));
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/vlm01/production/abc123-1200x800.jpg?w=640&h=480&fit=crop&auto=format"
        );
    }

    #[test]
    fn test_width_only_omits_crop() {
        let img = image("image-abc123-1200x800-webp");
        let url = builder().url(Some(&img), Some(640), None);
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/vlm01/production/abc123-1200x800.webp?w=640&auto=format"
        );
    }

    #[test]
    fn test_malformed_references_yield_placeholder() {
        for bad in [
            "",
            "image",
            "image-abc123",
            "image-abc123-1200x800",
            "file-abc123-1200x800-jpg",
            "image-abc123-notdims-jpg",
            "image-abc123-1200x800-jpg-extra",
            "image--1200x800-jpg",
        ] {
            assert_eq!(
                builder().url(Some(&image(bad)), Some(100), Some(100)),
                PLACEHOLDER_IMAGE,
                "expected placeholder for {bad:?}"
            );
        }
    }
}
