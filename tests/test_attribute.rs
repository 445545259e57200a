use csproj_edit::{Document, Element, Error, Rename};
use std::path::Path;

const FIXTURES: [&str; 2] = [
    "SimpleOldCsProjUtf8_CRLF.csproj",
    "SimpleOldCsProjUtf8_LF.csproj",
];

fn load(file_name: &str) -> Document {
    Document::load_file(Path::new("tests/documents").join(file_name)).unwrap()
}

fn no_attributes(doc: &Document, elem: Element) -> bool {
    !elem.has_attributes(doc)
}

#[test]
fn get() {
    for fixture in FIXTURES.iter() {
        let doc = load(fixture);
        assert!(doc.exists_node("ItemGroup", "SDKReference"));
        assert_eq!(
            doc.get_attribute("ItemGroup", "SDKReference"),
            vec!["Include", "Include"]
        );
        assert!(doc.get_attribute("ItemGroup", "SDKReferenceX").is_empty());
        assert!(!doc.exists_node("ItemGroup", "SDKReferenceX"));
    }
}

#[test]
fn exists() {
    for fixture in FIXTURES.iter() {
        let doc = load(fixture);
        assert!(doc.exists_attribute("ItemGroup", "SDKReference", "Include"));
        assert!(doc.exists_attribute("ItemGroup", "Compile", "Include"));
        assert!(doc.exists_attribute("ItemGroup", "None", "Include"));
        assert!(doc.exists_attribute("Target", "Message", "Importance"));
        // missing attribute
        assert!(!doc.exists_attribute("ItemGroup", "SDKReference", "IncludeX"));
        assert!(!doc.exists_attribute("ItemGroup", "Compile", "IncludeX"));
        // missing node or group
        assert!(!doc.exists_node("ItemGroup", "NoneX"));
        assert!(!doc.exists_attribute("ItemGroup", "NoneX", "Include"));
        assert!(!doc.exists_node("TargetA", "Message"));
        assert!(!doc.exists_attribute("TargetA", "Message", "Importance"));
    }
}

#[test]
fn insert() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        assert!(!doc.exists_node("PropertyGroup", "Hogemoge"));
        doc.insert_node("PropertyGroup", "Hogemoge", "value").unwrap();
        doc.insert_attribute("PropertyGroup", "Hogemoge", "Fugafuga", "Value", no_attributes)
            .unwrap();
        assert!(doc.exists_attribute_value("PropertyGroup", "Hogemoge", "Fugafuga", "Value"));

        assert!(doc.exists_node("PropertyGroup", "OutputType"));
        doc.insert_attribute("PropertyGroup", "OutputType", "Fugafuga", "Value", no_attributes)
            .unwrap();
        assert!(doc.exists_attribute_value("PropertyGroup", "OutputType", "Fugafuga", "Value"));
        // insert adds another node
        assert_eq!(
            doc.get_node("PropertyGroup", "OutputType"),
            vec!["OutputType", "OutputType"]
        );
    }
}

#[test]
fn insert_missing_group() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        let before = doc.serialize().unwrap();
        let result =
            doc.insert_attribute("Hogemoge", "Hogemoge", "Fugafuga", "Value", no_attributes);
        assert!(matches!(result, Err(Error::MissingContainer { .. })));
        let result = doc.insert_node("Hogemoge", "Hogemoge", "value");
        assert!(matches!(result, Err(Error::MissingContainer { .. })));
        assert_eq!(doc.serialize().unwrap(), before);
    }
}

#[test]
fn insert_first_occurrence_of_node() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        doc.insert_attribute("ItemGroup", "Reference", "Include", "System.Xml", |_, _| true)
            .unwrap();
        assert_eq!(doc.get_node("ItemGroup", "Reference"), vec!["Reference"]);
        assert!(doc.exists_attribute_value("ItemGroup", "Reference", "Include", "System.Xml"));
    }
}

#[test]
fn insert_and_set_occurrence_counts() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        let predicates: [fn(&Document, Element) -> bool; 3] =
            [no_attributes, |_, _| true, |_, _| false];
        for predicate in predicates.iter() {
            let n = doc.get_node("ItemGroup", "Compile").len();
            doc.insert_attribute("ItemGroup", "Compile", "Include", "New.cs", predicate)
                .unwrap();
            assert_eq!(doc.get_node("ItemGroup", "Compile").len(), n + 1);
            doc.set_attribute("ItemGroup", "Compile", "Link", "x", |_, _| true);
            assert_eq!(doc.get_node("ItemGroup", "Compile").len(), n + 1);
        }
    }
}

#[test]
fn set() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        assert!(!doc.exists_node("PropertyGroup", "Hogemoge"));
        doc.insert_node("PropertyGroup", "Hogemoge", "value").unwrap();
        doc.set_attribute("PropertyGroup", "Hogemoge", "Fugafuga", "Value", no_attributes);
        assert!(doc.exists_attribute_value("PropertyGroup", "Hogemoge", "Fugafuga", "Value"));

        assert!(doc.exists_node("PropertyGroup", "OutputType"));
        doc.set_attribute("PropertyGroup", "OutputType", "Fugafuga", "Value", no_attributes);
        assert!(doc.exists_attribute_value("PropertyGroup", "OutputType", "Fugafuga", "Value"));
        // set changes the existing node
        assert_eq!(doc.get_node("PropertyGroup", "OutputType"), vec!["OutputType"]);
    }
}

#[test]
fn set_keeps_other_attributes() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        let before = doc.serialize().unwrap();
        doc.set_attribute("PropertyGroup", "Configuration", "Label", "x", |_, _| true);
        let expected = before.replace(
            "<Configuration Condition=\" '$(Configuration)' == '' \">",
            "<Configuration Condition=\" '$(Configuration)' == '' \" Label=\"x\">",
        );
        assert_ne!(expected, before);
        assert_eq!(doc.serialize().unwrap(), expected);
    }
}

#[test]
fn set_missing_group() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        let before = doc.serialize().unwrap();
        doc.set_attribute("Hogemoge", "Hogemoge", "Fugafuga", "Value", no_attributes);
        assert!(!doc.exists_node("Hogemoge", "Hogemoge"));
        assert_eq!(doc.serialize().unwrap(), before);
    }
}

#[test]
fn replace() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        assert!(doc.exists_attribute("ItemGroup", "SDKReference", "Include"));
        doc.replace_attribute(
            "ItemGroup",
            "SDKReference",
            "Include",
            "Microsoft.VCLibs, Version=14.0",
            Rename::To("Hogemoge"),
        );
        assert!(doc.exists_attribute("ItemGroup", "SDKReference", "Hogemoge"));
        assert!(doc.exists_attribute_value(
            "ItemGroup",
            "SDKReference",
            "Hogemoge",
            "Microsoft.VCLibs, Version=14.0"
        ));
        // the other SDKReference keeps its key
        assert!(doc.exists_attribute_value(
            "ItemGroup",
            "SDKReference",
            "Include",
            "WindowsMobile, Version=10.0.17763.0"
        ));
        assert_eq!(
            doc.get_attribute("ItemGroup", "SDKReference"),
            vec!["Hogemoge", "Include"]
        );

        doc.replace_attribute(
            "ItemGroup",
            "Compile",
            "Include",
            "App.cs",
            Rename::Substitute {
                pattern: "In",
                replacement: "Ex",
            },
        );
        assert!(doc.exists_attribute("ItemGroup", "Compile", "Exclude"));
        assert!(doc.exists_attribute_value("ItemGroup", "Compile", "Exclude", "App.cs"));
    }
}

#[test]
fn replace_without_match() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        let before = doc.serialize().unwrap();

        // missing attribute
        doc.replace_attribute(
            "ItemGroup",
            "SDKReference",
            "IncludeX",
            "Microsoft.VCLibs, Version=14.0",
            Rename::To("Hogemoge"),
        );
        assert!(!doc.exists_attribute_value("ItemGroup", "SDKReference", "Include", "Hogemoge"));
        // value does not match
        doc.replace_attribute(
            "ItemGroup",
            "SDKReference",
            "Include",
            "Microsoft.VCLibs, Version=99.0",
            Rename::To("Hogemoge"),
        );
        // missing node
        doc.replace_attribute(
            "ItemGroup",
            "SDKReferenceX",
            "Include",
            "Microsoft.VCLibs, Version=14.0",
            Rename::To("Hogemoge"),
        );
        assert!(!doc.exists_attribute_value("ItemGroup", "SDKReferenceX", "Include", "Hogemoge"));
        assert_eq!(doc.serialize().unwrap(), before);
    }
}

#[test]
fn remove() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        assert!(doc.exists_attribute_value(
            "ItemGroup",
            "SDKReference",
            "Include",
            "Microsoft.VCLibs, Version=14.0"
        ));
        doc.remove_attribute(
            "ItemGroup",
            "SDKReference",
            "Include",
            "Microsoft.VCLibs, Version=14.0",
        );
        assert!(!doc.exists_attribute_value(
            "ItemGroup",
            "SDKReference",
            "Include",
            "Microsoft.VCLibs, Version=14.0"
        ));
        assert_eq!(doc.get_attribute("ItemGroup", "SDKReference"), vec!["Include"]);
        assert_eq!(doc.get_node("ItemGroup", "SDKReference").len(), 2);
    }
}

#[test]
fn remove_without_match() {
    for fixture in FIXTURES.iter() {
        let mut doc = load(fixture);
        let before = doc.serialize().unwrap();
        doc.remove_attribute(
            "ItemGroup",
            "SDKReferenceX",
            "Include",
            "Microsoft.VCLibs, Version=14.0",
        );
        doc.remove_attribute("ItemGroup", "SDKReference", "Include", "Other");
        assert_eq!(doc.serialize().unwrap(), before);
    }
}
