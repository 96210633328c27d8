// Эти предупреждения конфликтуют с API валидатора Garde.
#![allow(clippy::trivially_copy_pass_by_ref, clippy::ptr_arg)]

use crate::utils::PrintErrorChain;
use std::{fs, io, path::PathBuf};
use url::Url;

pub fn is_base_url(url: &Url, _: &()) -> garde::Result {
    if url.cannot_be_a_base() {
        Err(garde::Error::new(
            "url should be base, e.g. https://site.com/",
        ))
    } else {
        Ok(())
    }
}

pub fn is_shorter_than(limit: &u64) -> impl FnOnce(&u64, &()) -> garde::Result + '_ {
    move |value, _| {
        if value >= limit {
            Err(garde::Error::new(format!(
                "value should be less than {limit}"
            )))
        } else {
            Ok(())
        }
    }
}

pub fn is_directory_and_exists(path: &PathBuf, _: &()) -> garde::Result {
    let dpath = path.display();

    let is_exists = path.try_exists().map_err(IoValidationError)?;
    if !is_exists {
        return Err(garde::Error::new(format!("path '{dpath}' does not exists")));
    }

    let metadata = fs::metadata(path).map_err(IoValidationError)?;
    if !metadata.is_dir() {
        return Err(garde::Error::new(format!("'{dpath}' is not a directory")));
    }

    Ok(())
}

struct IoValidationError(io::Error);

impl From<IoValidationError> for garde::Error {
    fn from(error: IoValidationError) -> Self {
        garde::Error::new(format!(
            "io error during validation: {err}",
            err = PrintErrorChain(&error.0)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_than() {
        assert!(is_shorter_than(&300)(&3, &()).is_ok());
        assert!(is_shorter_than(&300)(&300, &()).is_err());
    }

    #[test]
    fn missing_directory_is_rejected() {
        let path = PathBuf::from("/definitely/not/here/responses");
        assert!(is_directory_and_exists(&path, &()).is_err());
        assert!(is_directory_and_exists(&std::env::temp_dir(), &()).is_ok());
    }

    #[test]
    fn relative_url_is_not_base() {
        let url = Url::parse("mailto:admin@vk.com").unwrap();
        assert!(is_base_url(&url, &()).is_err());
        assert!(is_base_url(&Url::parse("https://api.vk.com/").unwrap(), &()).is_ok());
    }
}
