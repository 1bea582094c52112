use indexmap::IndexMap;
use serde::Deserialize;

use crate::{ParseRequestError, Request, ServerError, Upload};

/// The `map` field of a multipart request.
///
/// Associates the name of each file part with the paths, relative to the root of the
/// `operations` field, at which the file must be placed. Names keep the order in which they
/// appear in the field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FileMap(IndexMap<String, Vec<String>>);

impl FileMap {
    /// Parse the `map` field.
    pub fn parse(map: &str) -> Result<Self, ParseRequestError> {
        serde_json::from_str(map).map_err(ParseRequestError::InvalidFilesMap)
    }

    /// Returns an iterator over the file names and their paths.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, paths)| (name.as_str(), paths.as_slice()))
    }

    /// Place every file mapped into `request` in its variables.
    ///
    /// Only the paths starting with the request's prefix are considered. A file name is checked
    /// against `files` only if at least one of its paths targets this request. Every problem is
    /// reported, the variables keep all the uploads that could be placed.
    pub fn apply<'a, F>(&self, request: &mut Request, files: F) -> Vec<ServerError>
    where
        F: Fn(&str) -> Option<&'a Upload>,
    {
        let prefix = request.path_prefix().to_string();
        let mut errors = Vec::new();

        for (field, paths) in &self.0 {
            let paths: Vec<_> = paths
                .iter()
                .filter_map(|path| {
                    path.strip_prefix(prefix.as_str())
                        .map(|var_path| (path, var_path))
                })
                .collect();
            if paths.is_empty() {
                continue;
            }

            let upload = match files(field) {
                Some(upload) => upload,
                None => {
                    errors.push(ParseRequestError::MissingFile(field.clone()).into());
                    continue;
                }
            };

            for (path, var_path) in paths {
                if !request.set_upload(var_path, upload.clone()) {
                    errors.push(
                        ParseRequestError::InvalidMapPath {
                            path: path.clone(),
                            field: field.clone(),
                        }
                        .into(),
                    );
                }
            }
        }

        errors
    }
}
