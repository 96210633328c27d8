use std::fmt::{self, Display};

/// Печатает ошибку вместе со всей цепочкой `source()` через `: `.
pub struct PrintErrorChain<'a>(pub &'a dyn std::error::Error);

impl<'a> Display for PrintErrorChain<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self.0, f)?;

        let mut source = self.0.source();
        while let Some(error) = source {
            f.write_str(": ")?;
            Display::fmt(error, f)?;
            source = error.source();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Outer(io::Error);

    impl Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("reading responses dir")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn prints_whole_chain() {
        let error = Outer(io::Error::new(io::ErrorKind::NotFound, "no such dir"));

        assert_eq!(
            PrintErrorChain(&error).to_string(),
            "reading responses dir: no such dir"
        );
    }
}
