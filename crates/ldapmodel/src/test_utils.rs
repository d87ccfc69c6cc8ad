use crate::attributes::AttributeSpec;
use crate::directory::memory::MemDirectory;
use crate::model::ModelClass;

pub const JACK: &str = "cn=jack,dc=example,dc=com";

pub fn person_class() -> ModelClass {
    ModelClass::builder("person")
        .attr("cn", AttributeSpec::new("cn"))
        .attr("lastname", AttributeSpec::new("sn").not_nullable())
        .attr("description", AttributeSpec::new("description"))
        .attr("invalidAttribute", AttributeSpec::new("invalid"))
        .attr("shell", AttributeSpec::new("loginShell"))
        .attr(
            "mail",
            AttributeSpec::new("mail").with_default("nobody@example.com"),
        )
        .attr("phone", AttributeSpec::new("telephoneNumber").multiple())
        .attr("title", AttributeSpec::new("title").with_server_default("Staff"))
        .rdn("cn")
        .build()
        .expect("person model is valid")
}

/// A `dc=example,dc=com` tree with four people and one non-person entry.
pub fn seeded_directory() -> MemDirectory {
    let directory = MemDirectory::new().with_schema([
        "cn",
        "sn",
        "description",
        "loginShell",
        "mail",
        "telephoneNumber",
        "title",
    ]);
    directory.insert(
        JACK,
        [
            ("objectClass", vec!["person"]),
            ("cn", vec!["jack"]),
            ("sn", vec!["O'Neill"]),
            ("loginShell", vec!["/bin/bash"]),
        ],
    );
    directory.insert(
        "cn=daniel,dc=example,dc=com",
        [
            ("objectClass", vec!["person"]),
            ("cn", vec!["daniel"]),
            ("sn", vec!["Jackson"]),
            ("telephoneNumber", vec!["5550100", "5550101"]),
        ],
    );
    directory.insert(
        "cn=sam,dc=example,dc=com",
        [
            ("objectClass", vec!["person"]),
            ("cn", vec!["sam"]),
            ("sn", vec!["Carter"]),
            ("loginShell", vec!["/bin/zsh"]),
        ],
    );
    directory.insert(
        "cn=teal'c,ou=allies,dc=example,dc=com",
        [
            ("objectClass", vec!["person"]),
            ("cn", vec!["teal'c"]),
            ("sn", vec!["Teal'c"]),
            ("loginShell", vec!["/bin/bash"]),
        ],
    );
    directory.insert(
        "cn=sgc,dc=example,dc=com",
        [("objectClass", vec!["organizationalRole"]), ("cn", vec!["sgc"])],
    );
    directory
}
